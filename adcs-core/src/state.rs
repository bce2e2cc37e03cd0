/// Latest filtered inertial reading.
///
/// `mag` is the raw magnetometer field in µT, `gyro` the decimated and
/// averaged body rate in deg/s. Axes are X, Y, Z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuData {
    pub mag: [f32; 3],
    pub gyro: [f32; 3],
}

impl ImuData {
    pub const ZERO: ImuData = ImuData {
        mag: [0.0; 3],
        gyro: [0.0; 3],
    };
}

/// One raw sample as returned by an IMU driver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ImuSample {
    pub mag: [f32; 3],
    pub gyro: [f32; 3],
}

/// Bus voltage in volts and current in milliamps.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerReading {
    pub voltage: f32,
    pub current_ma: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PdChannel {
    XPos = 0,
    XNeg = 1,
    YPos = 2,
    YNeg = 3,
    ZPos = 4,
    ZNeg = 5,
}

impl PdChannel {
    pub const ALL: [PdChannel; 6] = [
        PdChannel::XPos,
        PdChannel::XNeg,
        PdChannel::YPos,
        PdChannel::YNeg,
        PdChannel::ZPos,
        PdChannel::ZNeg,
    ];

    /// Channels the flywheel can steer toward. Z faces are ignored.
    pub const LATERAL: [PdChannel; 4] = [
        PdChannel::XPos,
        PdChannel::XNeg,
        PdChannel::YPos,
        PdChannel::YNeg,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Six photodiode readings indexed by [`PdChannel`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhotodiodeReadings {
    pub channels: [f32; 6],
}

impl PhotodiodeReadings {
    pub const fn new(channels: [f32; 6]) -> Self {
        Self { channels }
    }

    pub fn get(&self, channel: PdChannel) -> f32 {
        self.channels[channel.index()]
    }

    pub fn set(&mut self, channel: PdChannel, value: f32) {
        self.channels[channel.index()] = value;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorDirection {
    Forward,
    Reverse,
    /// Hold the current command.
    Idle,
}
