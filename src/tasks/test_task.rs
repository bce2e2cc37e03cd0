//! Open-loop actuator and sensor exercises driven from the TES.

use adcs_core::routines::{
    AttitudePlaceholder, BasicMotion, BldcRamp, BldcStep, MtxOutcome, MtxTest, PhotodiodeOutcome, PhotodiodeTest,
};
use embassy_executor::task;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Instant, Ticker};

use crate::state::{DiagRecord, DownlinkHandle, FlywheelHandle, MagnetorquerHandle, PhotodiodeHandle};
use crate::usb::DIAG_DEPTH;
use crate::{CONFIG, SHARED};

pub type DiagSender = Sender<'static, CriticalSectionRawMutex, DiagRecord, DIAG_DEPTH>;

fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}

#[task]
pub async fn basic_motion_task(flywheel: FlywheelHandle, downlink: DownlinkHandle) {
    let mut motion = BasicMotion::new(&SHARED, &CONFIG, flywheel, downlink);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.motion_ms));
    loop {
        motion.cycle().await;
        ticker.next().await;
    }
}

/// Steps the ramp every `bldc_ms` while it runs; other tasks keep running
/// in between, including the command receiver that can abort it.
#[task]
pub async fn bldc_task(flywheel: FlywheelHandle, downlink: DownlinkHandle, diag: DiagSender) {
    let mut ramp = BldcRamp::new(&SHARED, &CONFIG, flywheel, downlink);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.bldc_ms));
    loop {
        match ramp.step(now_ms()).await {
            BldcStep::Running(sample) => {
                defmt::debug!("bldc t={} pwm={} freq={}", sample.t_ms, sample.power, sample.frequency);
                let _ = diag.try_send(DiagRecord::Bldc(sample));
            }
            BldcStep::Finished => defmt::info!("bldc ramp complete"),
            BldcStep::Aborted | BldcStep::Inactive => {}
        }
        ticker.next().await;
    }
}

#[task]
pub async fn mtx_task(magnetorquers: MagnetorquerHandle, flywheel: FlywheelHandle, downlink: DownlinkHandle, diag: DiagSender) {
    let mut test = MtxTest::new(&SHARED, &CONFIG, magnetorquers, flywheel, downlink);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.mtx_ms));
    loop {
        if let MtxOutcome::Energized(sample) = test.cycle(now_ms()).await {
            defmt::info!("mtx t={} pwm={} freq={}", sample.t_ms, sample.power, sample.frequency);
            let _ = diag.try_send(DiagRecord::Mtx(sample));
        }
        ticker.next().await;
    }
}

#[task]
pub async fn photodiode_task(photodiodes: PhotodiodeHandle, diag: DiagSender) {
    let mut test = PhotodiodeTest::new(&SHARED, photodiodes);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.photodiode_ms));
    loop {
        match test.cycle().await {
            PhotodiodeOutcome::Sampled(readings) => {
                let _ = diag.try_send(DiagRecord::Photodiodes {
                    t_ms: now_ms(),
                    readings,
                });
            }
            PhotodiodeOutcome::Fault(e) => defmt::warn!("photodiode test: {:?}", e),
            PhotodiodeOutcome::Inactive => {}
        }
        ticker.next().await;
    }
}

#[derive(Clone, Copy)]
pub enum AttitudeSlot {
    Determination,
    Control,
}

#[task(pool_size = 2)]
pub async fn attitude_task(slot: AttitudeSlot) {
    let mut placeholder = match slot {
        AttitudeSlot::Determination => AttitudePlaceholder::determination(&SHARED),
        AttitudeSlot::Control => AttitudePlaceholder::control(&SHARED),
    };
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.attitude_ms));
    loop {
        placeholder.cycle();
        ticker.next().await;
    }
}
