use adcs_core::routines::Heartbeat;
use embassy_executor::task;
use embassy_time::{Duration, Ticker};

use crate::drivers::ina209::Ina209;
use crate::state::{DownlinkHandle, FlywheelHandle, MagnetorquerHandle, PhotodiodeHandle};
use crate::{CONFIG, SHARED};

#[task]
pub async fn heartbeat_task(
    power: Ina209,
    photodiodes: PhotodiodeHandle,
    flywheel: FlywheelHandle,
    magnetorquers: MagnetorquerHandle,
    downlink: DownlinkHandle,
) {
    let mut heartbeat = Heartbeat::new(&SHARED, &CONFIG, power, photodiodes, flywheel, magnetorquers, downlink);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.heartbeat_ms));
    loop {
        heartbeat.cycle().await;
        ticker.next().await;
    }
}
