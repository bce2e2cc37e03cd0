//! Handle types shared between tasks and the diagnostic records sent to the
//! USB console.

use adcs_core::routines::{BldcSample, MtxSample};
use adcs_core::{PhotodiodeReadings, SharedActuator, SharedDevice};
use embassy_stm32::i2c::I2c;
use embassy_stm32::peripherals::{DMA1_CH0, DMA1_CH7, I2C1};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use crate::drivers::drv10970::Drv10970;
use crate::drivers::photodiode_mux::PhotodiodeMux;
use crate::drivers::tes_link::TesTx;
use crate::drivers::zxmb5210::MagnetorquerPair;

/// I2C1 carries the magnetometer and the power monitor.
pub type I2cBus = Mutex<CriticalSectionRawMutex, I2c<'static, I2C1, DMA1_CH7, DMA1_CH0>>;

pub type FlywheelHandle = &'static SharedActuator<Drv10970>;
pub type MagnetorquerHandle = &'static SharedActuator<MagnetorquerPair>;
pub type PhotodiodeHandle = &'static SharedDevice<PhotodiodeMux>;
pub type DownlinkHandle = &'static SharedDevice<TesTx>;

/// One line of test capture for the debug console.
#[derive(Clone, Copy)]
pub enum DiagRecord {
    Bldc(BldcSample),
    Mtx(MtxSample),
    Photodiodes { t_ms: u32, readings: PhotodiodeReadings },
}
