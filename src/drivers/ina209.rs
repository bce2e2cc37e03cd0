use adcs_core::hal::PowerMonitor;
use adcs_core::{PowerReading, SensorError};

use crate::state::I2cBus;

pub const INA209_ADDR: u8 = 0x40;

const REG_CONFIG: u8 = 0x00;
const REG_BUS_VOLTAGE: u8 = 0x04;
const REG_CURRENT: u8 = 0x07;
const REG_CALIBRATION: u8 = 0x16;

/// 32 V range, ±320 mV shunt range, 12-bit, continuous.
const CONFIG: u16 = 0x399F;
/// 0.1 Ω shunt, 100 µA current LSB.
const CALIBRATION: u16 = 4096;
const MV_PER_BUS_LSB: f32 = 4.0;

/// Bus voltage and current monitor.
pub struct Ina209 {
    bus: &'static I2cBus,
}

impl Ina209 {
    pub fn new(bus: &'static I2cBus) -> Self {
        Self { bus }
    }

    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.write_reg(REG_CONFIG, CONFIG).await?;
        self.write_reg(REG_CALIBRATION, CALIBRATION).await
    }

    async fn write_reg(&mut self, reg: u8, value: u16) -> Result<(), SensorError> {
        let [hi, lo] = value.to_be_bytes();
        self.bus
            .lock()
            .await
            .blocking_write(INA209_ADDR, &[reg, hi, lo])
            .map_err(|_| SensorError::Bus)
    }

    async fn read_reg(&mut self, reg: u8) -> Result<u16, SensorError> {
        let mut data = [0u8; 2];
        self.bus
            .lock()
            .await
            .blocking_write_read(INA209_ADDR, &[reg], &mut data)
            .map_err(|_| SensorError::Bus)?;
        Ok(u16::from_be_bytes(data))
    }
}

impl PowerMonitor for Ina209 {
    async fn read(&mut self) -> Result<PowerReading, SensorError> {
        let bus_raw = self.read_reg(REG_BUS_VOLTAGE).await?;
        let current_raw = self.read_reg(REG_CURRENT).await? as i16;
        Ok(PowerReading {
            voltage: (bus_raw >> 3) as f32 * MV_PER_BUS_LSB / 1000.0,
            current_ma: current_raw as f32 / 10.0,
        })
    }
}
