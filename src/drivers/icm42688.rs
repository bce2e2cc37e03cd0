use adcs_core::SensorError;
use embassy_stm32::dma::NoDma;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::spi::{Instance, Spi};
use embassy_time::{Duration, Timer};

const REG_DEVICE_CONFIG: u8 = 0x11;
const REG_GYRO_DATA_X1: u8 = 0x25;
const REG_INT_STATUS: u8 = 0x2D;
const REG_PWR_MGMT0: u8 = 0x4E;
const REG_GYRO_CONFIG0: u8 = 0x4F;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I: u8 = 0x47;
const DATA_RDY_INT: u8 = 0x08;
/// ±250 dps full scale, 200 Hz ODR.
const GYRO_CONFIG: u8 = 0x67;
const LSB_PER_DPS: f32 = 131.0;

/// ICM-42688 used as a gyro only.
pub struct Icm42688<'d, T: Instance> {
    spi: Spi<'d, T, NoDma, NoDma>,
    cs: Output<'d, AnyPin>,
}

impl<'d, T: Instance> Icm42688<'d, T> {
    pub fn new(spi: Spi<'d, T, NoDma, NoDma>, cs: Output<'d, AnyPin>) -> Self {
        Self { spi, cs }
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        let buf = [reg & 0x7F, value];
        self.cs.set_low();
        let res = self.spi.blocking_write(&buf);
        self.cs.set_high();
        res.map_err(|_| SensorError::Bus)
    }

    fn read_regs(&mut self, reg: u8, out: &mut [u8]) -> Result<(), SensorError> {
        let mut tx = [0u8; 7];
        let mut rx = [0u8; 7];
        let n = out.len() + 1;
        tx[0] = reg | 0x80;

        self.cs.set_low();
        let res = self.spi.blocking_transfer(&mut rx[..n], &tx[..n]);
        self.cs.set_high();

        res.map_err(|_| SensorError::Bus)?;
        out.copy_from_slice(&rx[1..n]);
        Ok(())
    }

    pub async fn init(&mut self) -> Result<(), SensorError> {
        self.write_reg(REG_DEVICE_CONFIG, 0x01)?;
        Timer::after(Duration::from_millis(10)).await;

        let mut id = [0u8];
        self.read_regs(REG_WHO_AM_I, &mut id)?;
        if id[0] != WHO_AM_I {
            defmt::warn!("icm42688: unexpected id {:#x}", id[0]);
            return Err(SensorError::NotReady);
        }

        self.write_reg(REG_GYRO_CONFIG0, GYRO_CONFIG)?;
        // Gyro in low-noise mode, accel off.
        self.write_reg(REG_PWR_MGMT0, 0x0C)?;
        Timer::after(Duration::from_millis(50)).await;
        Ok(())
    }

    pub fn data_ready(&mut self) -> Result<bool, SensorError> {
        let mut status = [0u8];
        self.read_regs(REG_INT_STATUS, &mut status)?;
        Ok(status[0] & DATA_RDY_INT != 0)
    }

    /// Body rates in deg/s.
    pub fn read_gyro(&mut self) -> Result<[f32; 3], SensorError> {
        let mut raw = [0u8; 6];
        self.read_regs(REG_GYRO_DATA_X1, &mut raw)?;
        let mut dps = [0.0; 3];
        for (axis, out) in dps.iter_mut().enumerate() {
            let v = i16::from_be_bytes([raw[2 * axis], raw[2 * axis + 1]]);
            *out = v as f32 / LSB_PER_DPS;
        }
        Ok(dps)
    }
}
