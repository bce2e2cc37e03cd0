use super::{checksum, ProtocolVersion, CHECKSUM_LEN, MAX_COMMAND_LEN};
use crate::error::ProtocolError;

/// A command frame being assembled from the link.
///
/// Bytes are appended one at a time (or loaded in bulk) until the frame
/// reaches the fixed length of its protocol version. Appending to a full
/// frame does nothing; the caller clears it before reuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    version: ProtocolVersion,
    bytes: [u8; MAX_COMMAND_LEN],
    received: usize,
}

impl CommandFrame {
    pub const fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            bytes: [0; MAX_COMMAND_LEN],
            received: 0,
        }
    }

    /// A complete frame carrying `opcode` with a valid checksum.
    pub fn build(version: ProtocolVersion, opcode: u16) -> Self {
        let mut frame = Self::new(version);
        let op = opcode.to_le_bytes();
        let n = version.opcode_len();
        frame.bytes[..n].copy_from_slice(&op[..n]);
        frame.received = n;
        let crc = frame.compute_checksum().to_le_bytes();
        frame.bytes[n..n + CHECKSUM_LEN].copy_from_slice(&crc);
        frame.received = version.command_len();
        frame
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Returns `true` once the frame is full.
    pub fn append_byte(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return true;
        }
        self.bytes[self.received] = byte;
        self.received += 1;
        self.is_full()
    }

    /// Load a whole frame at once. The slice must be exactly one frame long.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        let expected = self.version.command_len();
        if bytes.len() != expected {
            return Err(ProtocolError::Length {
                expected,
                actual: bytes.len(),
            });
        }
        self.clear();
        for &b in bytes {
            self.append_byte(b);
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.received >= self.version.command_len()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn opcode(&self) -> u16 {
        match self.version {
            ProtocolVersion::Compact => self.bytes[0] as u16,
            ProtocolVersion::Extended => u16::from_le_bytes([self.bytes[0], self.bytes[1]]),
        }
    }

    /// The checksum carried in the frame.
    pub fn checksum(&self) -> u16 {
        let n = self.version.opcode_len();
        u16::from_le_bytes([self.bytes[n], self.bytes[n + 1]])
    }

    /// The checksum the opcode bytes should carry.
    pub fn compute_checksum(&self) -> u16 {
        checksum(&self.bytes[..self.version.opcode_len()])
    }

    pub fn validate_checksum(&self) -> Result<(), ProtocolError> {
        let expected = self.compute_checksum();
        let received = self.checksum();
        if expected == received {
            Ok(())
        } else {
            Err(ProtocolError::Checksum { expected, received })
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.version.command_len()]
    }

    pub fn clear(&mut self) {
        self.bytes = [0; MAX_COMMAND_LEN];
        self.received = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_fills_then_ignores() {
        let mut frame = CommandFrame::new(ProtocolVersion::Compact);
        assert!(!frame.append_byte(0xA1));
        assert!(!frame.append_byte(0x00));
        assert!(frame.append_byte(0x00));
        assert!(frame.is_full());
        assert!(frame.append_byte(0xFF));
        assert_eq!(frame.received(), 3);
        assert_eq!(frame.as_bytes(), &[0xA1, 0x00, 0x00]);
    }

    #[test]
    fn load_equals_append() {
        let built = CommandFrame::build(ProtocolVersion::Extended, 0x00A1);
        let mut appended = CommandFrame::new(ProtocolVersion::Extended);
        for &b in built.as_bytes() {
            appended.append_byte(b);
        }
        let mut loaded = CommandFrame::new(ProtocolVersion::Extended);
        loaded.load_bytes(built.as_bytes()).unwrap();
        assert_eq!(appended, loaded);
        assert_eq!(loaded.opcode(), 0x00A1);
        assert!(loaded.validate_checksum().is_ok());
    }

    #[test]
    fn load_rejects_wrong_length() {
        let mut frame = CommandFrame::new(ProtocolVersion::Extended);
        assert_eq!(
            frame.load_bytes(&[0xA1, 0x00, 0x00]),
            Err(ProtocolError::Length { expected: 4, actual: 3 })
        );
    }

    #[test]
    fn any_corrupted_byte_fails_validation() {
        for version in [ProtocolVersion::Compact, ProtocolVersion::Extended] {
            let good = CommandFrame::build(version, 0x00C0);
            assert!(good.validate_checksum().is_ok());
            for i in 0..version.opcode_len() {
                for flip in [0x01u8, 0x80, 0xFF] {
                    let mut bytes = [0u8; MAX_COMMAND_LEN];
                    bytes[..version.command_len()].copy_from_slice(good.as_bytes());
                    bytes[i] ^= flip;
                    let mut bad = CommandFrame::new(version);
                    bad.load_bytes(&bytes[..version.command_len()]).unwrap();
                    assert!(bad.validate_checksum().is_err(), "byte {} flip {:#x}", i, flip);
                }
            }
        }
    }

    #[test]
    fn clear_resets_everything() {
        let mut frame = CommandFrame::build(ProtocolVersion::Compact, 0x00A0);
        frame.clear();
        assert_eq!(frame.received(), 0);
        assert!(!frame.is_full());
        assert_eq!(frame.as_bytes(), &[0, 0, 0]);
    }
}
