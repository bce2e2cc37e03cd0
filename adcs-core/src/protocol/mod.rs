//! TES wire protocol: fixed-size command and telemetry frames.
//!
//! Every multi-byte field is little-endian. The last two bytes of each
//! frame carry a CRC-16 (CCITT-FALSE) over all bytes before them.

mod command;
mod fixed;
mod telemetry;

pub use command::CommandFrame;
pub use fixed::{fixed_to_float, float_to_fixed, Fixed5_3};
pub use telemetry::{ActuatorFlags, EncodedFrame, StatusCode, TelemetryFrame};

pub const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_IBM_3740);

/// Largest command frame of any protocol version.
pub const MAX_COMMAND_LEN: usize = 4;
/// Largest telemetry frame of any protocol version.
pub const MAX_TELEMETRY_LEN: usize = 30;
pub const CHECKSUM_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolVersion {
    /// 1-byte opcode, 3-byte commands, 12-byte telemetry.
    Compact,
    /// 2-byte opcode, 4-byte commands, 30-byte telemetry.
    Extended,
}

impl ProtocolVersion {
    pub const fn command_len(self) -> usize {
        match self {
            Self::Compact => 3,
            Self::Extended => 4,
        }
    }

    pub const fn telemetry_len(self) -> usize {
        match self {
            Self::Compact => 12,
            Self::Extended => 30,
        }
    }

    pub const fn opcode_len(self) -> usize {
        self.command_len() - CHECKSUM_LEN
    }
}

pub fn checksum(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// Split a frame into body and trailing checksum and compare.
///
/// Returns `None` when the frame is too short to carry a checksum.
pub(crate) fn split_checksum(frame: &[u8]) -> Option<(u16, u16)> {
    if frame.len() < CHECKSUM_LEN {
        return None;
    }
    let (body, tail) = frame.split_at(frame.len() - CHECKSUM_LEN);
    Some((checksum(body), u16::from_le_bytes([tail[0], tail[1]])))
}

pub fn frame_checksum_valid(frame: &[u8]) -> bool {
    matches!(split_checksum(frame), Some((expected, received)) if expected == received)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc_matches_ccitt_false_check_value() {
        assert_eq!(checksum(b"123456789"), 0x29B1);
    }

    #[test]
    fn frame_sizes() {
        assert_eq!(ProtocolVersion::Compact.command_len(), 3);
        assert_eq!(ProtocolVersion::Compact.telemetry_len(), 12);
        assert_eq!(ProtocolVersion::Extended.command_len(), 4);
        assert_eq!(ProtocolVersion::Extended.telemetry_len(), 30);
        assert_eq!(ProtocolVersion::Extended.opcode_len(), 2);
    }

    #[test]
    fn short_frame_is_never_valid() {
        assert!(!frame_checksum_valid(&[]));
        assert!(!frame_checksum_valid(&[0xAA]));
    }
}
