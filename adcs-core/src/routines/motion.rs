use crate::config::AdcsConfig;
use crate::hal::{Flywheel, TelemetrySink};
use crate::mode::Mode;
use crate::protocol::StatusCode;
use crate::state::MotorDirection;
use crate::system::AdcsShared;

use super::send_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionOutcome {
    Inactive,
    /// Wheel commanded forward; `announced` is set on the first cycle of an
    /// activation, when TEST_START went out.
    Driving { announced: bool },
}

/// Open-loop forward spin at a fixed low power, active in
/// TEST_BASIC_MOTION.
pub struct BasicMotion<'a, F, S> {
    shared: &'a AdcsShared,
    config: &'a AdcsConfig,
    flywheel: F,
    sink: S,
    announced: bool,
}

impl<'a, F: Flywheel, S: TelemetrySink> BasicMotion<'a, F, S> {
    pub fn new(shared: &'a AdcsShared, config: &'a AdcsConfig, flywheel: F, sink: S) -> Self {
        Self {
            shared,
            config,
            flywheel,
            sink,
            announced: false,
        }
    }

    pub async fn cycle(&mut self) -> MotionOutcome {
        if self.shared.mode() != Mode::TestBasicMotion {
            self.announced = false;
            return MotionOutcome::Inactive;
        }

        let first = !self.announced;
        if first {
            if let Err(e) = send_status(&mut self.sink, StatusCode::TestStart, self.config.protocol).await {
                warn!("test start: {:?}", e);
            }
            self.announced = true;
        }

        let (flywheel, power) = (&mut self.flywheel, self.config.motion_power);
        match self
            .shared
            .while_in(Mode::TestBasicMotion, || flywheel.run(MotorDirection::Forward, power))
        {
            Some(()) => MotionOutcome::Driving { announced: first },
            None => MotionOutcome::Inactive,
        }
    }
}
