use core::fmt;

/// Failure reported by a sensor collaborator (IMU, INA209, photodiode mux).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The device has no new sample yet.
    NotReady,
    /// The bus transaction failed (NACK, arbitration loss, SPI fault).
    Bus,
    /// The device did not answer in time.
    Timeout,
}

/// Failure on the serial link to the TES.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    Overrun,
    Framing,
    Parity,
    Bus,
}

/// A frame that could not be accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    Length { expected: usize, actual: usize },
    Checksum { expected: u16, received: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdcsError {
    Sensor(SensorError),
    Link(LinkError),
    Protocol(ProtocolError),
}

impl From<SensorError> for AdcsError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<LinkError> for AdcsError {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<ProtocolError> for AdcsError {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReady => f.write_str("sensor not ready"),
            Self::Bus => f.write_str("sensor bus fault"),
            Self::Timeout => f.write_str("sensor timeout"),
        }
    }
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overrun => f.write_str("uart overrun"),
            Self::Framing => f.write_str("uart framing error"),
            Self::Parity => f.write_str("uart parity error"),
            Self::Bus => f.write_str("uart bus fault"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length { expected, actual } => {
                write!(f, "frame length {} (expected {})", actual, expected)
            }
            Self::Checksum { expected, received } => {
                write!(f, "checksum {:#06x} (expected {:#06x})", received, expected)
            }
        }
    }
}

impl fmt::Display for AdcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {}", e),
            Self::Link(e) => write!(f, "link: {}", e),
            Self::Protocol(e) => write!(f, "protocol: {}", e),
        }
    }
}
