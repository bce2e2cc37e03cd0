//! Collaborator interfaces implemented by the firmware drivers and by the
//! test fakes.
//!
//! Bus-backed devices are async so that a task waiting on I2C/SPI/UART
//! yields to the executor. Actuators are plain GPIO/PWM writes and stay
//! synchronous so the mode switch can quiesce them inside its critical
//! section.
#![allow(async_fn_in_trait)]

#[allow(unused_imports)]
use micromath::F32Ext;

use crate::error::{LinkError, SensorError};
use crate::state::{ImuSample, MotorDirection, PdChannel, PhotodiodeReadings, PowerReading};

/// Samples averaged per channel by [`PhotodiodeArray::read_filtered`].
pub const PD_FILTER_SAMPLES: u16 = 15;

pub trait Imu {
    /// Whether a fresh sample is waiting.
    async fn data_ready(&mut self) -> Result<bool, SensorError>;
    async fn read(&mut self) -> Result<ImuSample, SensorError>;
}

pub trait PowerMonitor {
    async fn read(&mut self) -> Result<PowerReading, SensorError>;
}

pub trait PhotodiodeArray {
    async fn read_channel(&mut self, channel: PdChannel) -> Result<f32, SensorError>;

    async fn read_all(&mut self) -> Result<PhotodiodeReadings, SensorError> {
        let mut readings = PhotodiodeReadings::default();
        for channel in PdChannel::ALL {
            readings.set(channel, self.read_channel(channel).await?);
        }
        Ok(readings)
    }

    /// Per-channel average of [`PD_FILTER_SAMPLES`] consecutive reads,
    /// rounded to the nearest count.
    async fn read_filtered(&mut self) -> Result<PhotodiodeReadings, SensorError> {
        let mut readings = PhotodiodeReadings::default();
        for channel in PdChannel::ALL {
            let mut sum = 0.0;
            for _ in 0..PD_FILTER_SAMPLES {
                sum += self.read_channel(channel).await?;
            }
            readings.set(channel, (sum / PD_FILTER_SAMPLES as f32).round());
        }
        Ok(readings)
    }
}

pub trait CommandLink {
    /// Read whatever arrived since the last call into `buf`, without
    /// waiting for bytes that are not there. Returns the number of bytes
    /// read; zero means the link was idle.
    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;
}

pub trait TelemetrySink {
    async fn send(&mut self, frame: &[u8]) -> Result<(), LinkError>;
}

pub trait Flywheel {
    /// Spin in `direction` at `power` (0..=255). `Idle` stops the wheel.
    fn run(&mut self, direction: MotorDirection, power: u8);
    fn stop(&mut self);
    /// Measured wheel speed in rev/s.
    fn frequency(&self) -> u8;
    fn is_enabled(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Coil {
    One,
    Two,
}

impl Coil {
    pub const BOTH: [Coil; 2] = [Coil::One, Coil::Two];
}

pub trait Magnetorquer {
    fn drive(&mut self, coil: Coil, direction: MotorDirection, power: u8);
    fn stop(&mut self);
    fn is_enabled(&self, coil: Coil) -> bool;
}
