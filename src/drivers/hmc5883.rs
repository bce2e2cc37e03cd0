use adcs_core::SensorError;
use embassy_time::Timer;

use crate::state::I2cBus;

pub const HMC5883L_ADDR: u8 = 0x1E;

/// Gain 1.3 Ga: 1090 LSB/G, 1 G = 100 µT.
const UT_PER_LSB: f32 = 100.0 / 1090.0;

pub struct Hmc5883 {
    bus: &'static I2cBus,
}

impl Hmc5883 {
    pub fn new(bus: &'static I2cBus) -> Self {
        Self { bus }
    }

    pub async fn init(&mut self) -> Result<(), SensorError> {
        let mut i2c = self.bus.lock().await;
        // Configuration Register A: 8-average, 75 Hz, normal measurement
        i2c.blocking_write(HMC5883L_ADDR, &[0x00, 0x78])
            .map_err(|_| SensorError::Bus)?;
        // Configuration Register B: gain 1.3 Ga
        i2c.blocking_write(HMC5883L_ADDR, &[0x01, 0x20])
            .map_err(|_| SensorError::Bus)?;
        // Mode Register: continuous measurement
        i2c.blocking_write(HMC5883L_ADDR, &[0x02, 0x00])
            .map_err(|_| SensorError::Bus)?;
        drop(i2c);

        Timer::after_millis(10).await;
        Ok(())
    }

    /// Field in µT, axes X, Y, Z.
    pub async fn read_field(&mut self) -> Result<[f32; 3], SensorError> {
        let mut data = [0u8; 6];
        self.bus
            .lock()
            .await
            .blocking_write_read(HMC5883L_ADDR, &[0x03], &mut data)
            .map_err(|_| SensorError::Bus)?;

        // Register order is X, Z, Y
        let x = i16::from_be_bytes([data[0], data[1]]);
        let z = i16::from_be_bytes([data[2], data[3]]);
        let y = i16::from_be_bytes([data[4], data[5]]);

        Ok([x as f32 * UT_PER_LSB, y as f32 * UT_PER_LSB, z as f32 * UT_PER_LSB])
    }
}
