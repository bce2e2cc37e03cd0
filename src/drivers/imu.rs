use adcs_core::hal::Imu;
use adcs_core::{ImuSample, SensorError};
use embassy_stm32::peripherals::SPI1;

use super::hmc5883::Hmc5883;
use super::icm42688::Icm42688;

/// Gyro on SPI plus magnetometer on the shared I2C bus, read as one unit.
/// Readiness follows the gyro; the magnetometer is sampled alongside.
pub struct AdcsImu {
    gyro: Icm42688<'static, SPI1>,
    mag: Hmc5883,
}

impl AdcsImu {
    pub fn new(gyro: Icm42688<'static, SPI1>, mag: Hmc5883) -> Self {
        Self { gyro, mag }
    }

    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.gyro.init().await?;
        self.mag.init().await
    }
}

impl Imu for AdcsImu {
    async fn data_ready(&mut self) -> Result<bool, SensorError> {
        self.gyro.data_ready()
    }

    async fn read(&mut self) -> Result<ImuSample, SensorError> {
        let gyro = self.gyro.read_gyro()?;
        let mag = self.mag.read_field().await?;
        Ok(ImuSample { mag, gyro })
    }
}
