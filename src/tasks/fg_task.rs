use core::sync::atomic::Ordering;

use embassy_executor::task;
use embassy_futures::select::{select, Either};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::peripherals::PC6;
use embassy_time::{Duration, Instant, Timer};

use crate::FLYWHEEL_RPS;

/// FG pulses per mechanical revolution (one per electrical cycle, 4 pole
/// pairs).
const PULSES_PER_REV: u32 = 4;
const GATE: Duration = Duration::from_secs(1);

/// Counts DRV10970 FG edges over a 1 s gate and publishes rev/s.
#[task]
pub async fn fg_task(mut fg: ExtiInput<'static, PC6>) {
    let mut pulses: u32 = 0;
    let mut gate_end = Instant::now() + GATE;
    loop {
        match select(fg.wait_for_rising_edge(), Timer::at(gate_end)).await {
            Either::First(()) => pulses += 1,
            Either::Second(()) => {
                let rps = (pulses / PULSES_PER_REV).min(u8::MAX as u32) as u8;
                FLYWHEEL_RPS.store(rps, Ordering::Relaxed);
                pulses = 0;
                gate_end += GATE;
            }
        }
    }
}
