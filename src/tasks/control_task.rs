//! Flywheel control loops: detumble and photodiode orient.

use adcs_core::routines::{Detumble, Orient};
use embassy_executor::task;
use embassy_time::{Duration, Ticker};

use crate::state::{FlywheelHandle, PhotodiodeHandle};
use crate::{CONFIG, SHARED};

#[task]
pub async fn detumble_task(flywheel: FlywheelHandle) {
    let mut detumble = Detumble::new(&SHARED, &CONFIG, flywheel);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.detumble_ms));
    loop {
        detumble.cycle();
        ticker.next().await;
    }
}

#[task]
pub async fn orient_task(photodiodes: PhotodiodeHandle, flywheel: FlywheelHandle) {
    let mut orient = Orient::new(&SHARED, &CONFIG, photodiodes, flywheel);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.orient_ms));
    loop {
        orient.cycle().await;
        ticker.next().await;
    }
}
