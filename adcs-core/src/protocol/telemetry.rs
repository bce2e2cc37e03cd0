#[allow(unused_imports)]
use micromath::F32Ext;

use super::{checksum, split_checksum, Fixed5_3, ProtocolVersion, CHECKSUM_LEN, MAX_TELEMETRY_LEN};
use crate::error::ProtocolError;
use crate::state::{ImuData, PhotodiodeReadings, PowerReading};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusCode {
    Ok,
    Hello,
    AdcsError,
    CommError,
    TestStart,
    TestEnd,
    MotorTest,
    MtxTest,
}

impl StatusCode {
    pub const fn code(self, version: ProtocolVersion) -> u8 {
        match self {
            Self::Ok => 0xAA,
            Self::Hello => 0xAF,
            Self::AdcsError => 0xF0,
            Self::CommError => match version {
                ProtocolVersion::Compact => 0xF0,
                ProtocolVersion::Extended => 0x99,
            },
            Self::TestStart => 0xB1,
            Self::TestEnd => 0xB2,
            Self::MotorTest => 0xB3,
            Self::MtxTest => 0xB4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorFlags {
    pub flywheel: bool,
    pub magnetorquer_1: bool,
    pub magnetorquer_2: bool,
}

/// Wire bytes of one telemetry frame, checksum included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedFrame {
    bytes: [u8; MAX_TELEMETRY_LEN],
    len: usize,
}

impl EncodedFrame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Typed telemetry fields.
///
/// The compact layout drops the actuator flags, photodiodes and mode echo,
/// and carries current in 10 mA units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryFrame {
    pub status: u8,
    pub voltage: Fixed5_3,
    pub current_ma: i16,
    pub speed_rps: u8,
    pub actuators: ActuatorFlags,
    /// Magnetic field in µT.
    pub mag: [i8; 3],
    /// Body rate in deg/s.
    pub gyro: [Fixed5_3; 3],
    pub photodiodes: [u16; 6],
    pub mode: u16,
}

struct Cursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn put(&mut self, bytes: &[u8]) {
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn u8(&mut self) -> u8 {
        let b = self.buf[self.pos];
        self.pos += 1;
        b
    }

    fn u16(&mut self) -> u16 {
        u16::from_le_bytes([self.u8(), self.u8()])
    }
}

impl TelemetryFrame {
    pub const fn new() -> Self {
        Self {
            status: 0,
            voltage: Fixed5_3::ZERO,
            current_ma: 0,
            speed_rps: 0,
            actuators: ActuatorFlags {
                flywheel: false,
                magnetorquer_1: false,
                magnetorquer_2: false,
            },
            mag: [0; 3],
            gyro: [Fixed5_3::ZERO; 3],
            photodiodes: [0; 6],
            mode: 0,
        }
    }

    /// A frame carrying only a status code.
    pub fn status_only(status: StatusCode, version: ProtocolVersion) -> Self {
        let mut frame = Self::new();
        frame.set_status(status, version);
        frame
    }

    pub fn set_status(&mut self, status: StatusCode, version: ProtocolVersion) {
        self.status = status.code(version);
    }

    pub fn set_power(&mut self, power: &PowerReading) {
        self.voltage = Fixed5_3::from_f32(power.voltage);
        self.current_ma = power.current_ma.round() as i16;
    }

    pub fn set_imu(&mut self, imu: &ImuData) {
        for axis in 0..3 {
            self.mag[axis] = imu.mag[axis].round() as i8;
            self.gyro[axis] = Fixed5_3::from_f32(imu.gyro[axis]);
        }
    }

    pub fn set_photodiodes(&mut self, readings: &PhotodiodeReadings) {
        for (slot, value) in self.photodiodes.iter_mut().zip(readings.channels.iter()) {
            *slot = value.round() as u16;
        }
    }

    pub fn encode(&self, version: ProtocolVersion) -> EncodedFrame {
        let mut bytes = [0u8; MAX_TELEMETRY_LEN];
        let len = version.telemetry_len();
        let mut w = Cursor {
            buf: &mut bytes[..len],
            pos: 0,
        };
        w.put(&[self.status, self.voltage.to_bits()]);
        match version {
            ProtocolVersion::Compact => {
                let tens = (self.current_ma / 10).clamp(i8::MIN as i16, i8::MAX as i16);
                w.put(&[tens as i8 as u8]);
            }
            ProtocolVersion::Extended => w.put(&self.current_ma.to_le_bytes()),
        }
        w.put(&[self.speed_rps]);
        if version == ProtocolVersion::Extended {
            w.put(&[
                self.actuators.flywheel as u8,
                self.actuators.magnetorquer_1 as u8,
                self.actuators.magnetorquer_2 as u8,
            ]);
        }
        for m in self.mag {
            w.put(&[m as u8]);
        }
        for g in self.gyro {
            w.put(&[g.to_bits()]);
        }
        if version == ProtocolVersion::Extended {
            for pd in self.photodiodes {
                w.put(&pd.to_le_bytes());
            }
            w.put(&self.mode.to_le_bytes());
        }
        let body = w.pos;
        debug_assert_eq!(body + CHECKSUM_LEN, len);
        let crc = checksum(&bytes[..body]);
        bytes[body..len].copy_from_slice(&crc.to_le_bytes());
        EncodedFrame { bytes, len }
    }

    /// Parse and verify a frame received from the ADCS.
    pub fn decode(version: ProtocolVersion, bytes: &[u8]) -> Result<Self, ProtocolError> {
        let expected = version.telemetry_len();
        if bytes.len() != expected {
            return Err(ProtocolError::Length {
                expected,
                actual: bytes.len(),
            });
        }
        if let Some((expected, received)) = split_checksum(bytes) {
            if expected != received {
                return Err(ProtocolError::Checksum { expected, received });
            }
        }

        let mut r = Reader { buf: bytes, pos: 0 };
        let mut frame = Self::new();
        frame.status = r.u8();
        frame.voltage = Fixed5_3::from_bits(r.u8());
        frame.current_ma = match version {
            ProtocolVersion::Compact => (r.u8() as i8 as i16) * 10,
            ProtocolVersion::Extended => r.u16() as i16,
        };
        frame.speed_rps = r.u8();
        if version == ProtocolVersion::Extended {
            frame.actuators = ActuatorFlags {
                flywheel: r.u8() != 0,
                magnetorquer_1: r.u8() != 0,
                magnetorquer_2: r.u8() != 0,
            };
        }
        for m in frame.mag.iter_mut() {
            *m = r.u8() as i8;
        }
        for g in frame.gyro.iter_mut() {
            *g = Fixed5_3::from_bits(r.u8());
        }
        if version == ProtocolVersion::Extended {
            for pd in frame.photodiodes.iter_mut() {
                *pd = r.u16();
            }
            frame.mode = r.u16();
        }
        Ok(frame)
    }

    /// Reset to the baseline after a send.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::frame_checksum_valid;

    fn sample() -> TelemetryFrame {
        let mut frame = TelemetryFrame::new();
        frame.set_status(StatusCode::Ok, ProtocolVersion::Extended);
        frame.set_power(&PowerReading {
            voltage: 7.4,
            current_ma: 312.0,
        });
        frame.speed_rps = 12;
        frame.actuators.flywheel = true;
        frame.set_imu(&ImuData {
            mag: [21.4, -3.6, 40.0],
            gyro: [0.5, -1.25, 3.0],
        });
        frame.set_photodiodes(&PhotodiodeReadings::new([100.0, 2.4, 3.5, 4.0, 5.0, 6.0]));
        frame.mode = 0x00A4;
        frame
    }

    #[test]
    fn extended_layout() {
        let encoded = sample().encode(ProtocolVersion::Extended);
        let b = encoded.as_bytes();
        assert_eq!(b.len(), 30);
        assert_eq!(b[0], 0xAA);
        assert_eq!(b[1], Fixed5_3::from_f32(7.4).to_bits());
        assert_eq!(&b[2..4], &312i16.to_le_bytes());
        assert_eq!(b[4], 12);
        assert_eq!(&b[5..8], &[1, 0, 0]);
        assert_eq!(&b[8..11], &[21, (-4i8) as u8, 40]);
        assert_eq!(b[11], 4);
        assert_eq!(&b[14..16], &100u16.to_le_bytes());
        assert_eq!(&b[26..28], &0x00A4u16.to_le_bytes());
        assert!(frame_checksum_valid(b));
    }

    #[test]
    fn compact_layout_scales_current() {
        let encoded = sample().encode(ProtocolVersion::Compact);
        let b = encoded.as_bytes();
        assert_eq!(b.len(), 12);
        assert_eq!(b[2], 31);
        assert_eq!(b[3], 12);
        assert_eq!(&b[4..7], &[21, (-4i8) as u8, 40]);
        assert!(frame_checksum_valid(b));
    }

    #[test]
    fn compact_current_saturates() {
        let mut frame = TelemetryFrame::new();
        frame.current_ma = 5000;
        let b = frame.encode(ProtocolVersion::Compact);
        assert_eq!(b.as_bytes()[2], i8::MAX as u8);
    }

    #[test]
    fn decode_recovers_fields() {
        let frame = sample();
        let decoded =
            TelemetryFrame::decode(ProtocolVersion::Extended, frame.encode(ProtocolVersion::Extended).as_bytes())
                .unwrap();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn any_corrupted_byte_fails_validation() {
        for version in [ProtocolVersion::Compact, ProtocolVersion::Extended] {
            let encoded = sample().encode(version);
            let len = version.telemetry_len();
            for i in 0..len - CHECKSUM_LEN {
                let mut bytes = [0u8; MAX_TELEMETRY_LEN];
                bytes[..len].copy_from_slice(encoded.as_bytes());
                bytes[i] = bytes[i].wrapping_add(1);
                assert!(!frame_checksum_valid(&bytes[..len]), "byte {}", i);
                assert!(matches!(
                    TelemetryFrame::decode(version, &bytes[..len]),
                    Err(ProtocolError::Checksum { .. })
                ));
            }
        }
    }

    #[test]
    fn comm_error_code_depends_on_version() {
        assert_eq!(StatusCode::CommError.code(ProtocolVersion::Extended), 0x99);
        assert_eq!(StatusCode::CommError.code(ProtocolVersion::Compact), 0xF0);
    }

    #[test]
    fn clear_resets_status() {
        let mut frame = sample();
        frame.clear();
        assert_eq!(frame, TelemetryFrame::new());
        assert_eq!(frame.status, 0);
    }
}
