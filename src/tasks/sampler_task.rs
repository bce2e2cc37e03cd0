use adcs_core::sampler::ImuSampler;
use embassy_executor::task;
use embassy_time::{Duration, Ticker};

use crate::drivers::imu::AdcsImu;
use crate::{CONFIG, SHARED};

/// Producer of the shared IMU snapshot.
#[task]
pub async fn sampler_task(imu: AdcsImu) {
    let mut sampler = ImuSampler::single(&SHARED, imu, CONFIG.stall_threshold);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.sampler_ms));
    loop {
        sampler.cycle().await;
        ticker.next().await;
    }
}
