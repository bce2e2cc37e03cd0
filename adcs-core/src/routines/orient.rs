use crate::config::AdcsConfig;
use crate::control::decide_direction;
use crate::error::SensorError;
use crate::hal::{Flywheel, PhotodiodeArray};
use crate::mode::Mode;
use crate::state::MotorDirection;
use crate::system::AdcsShared;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OrientOutcome {
    Inactive,
    Steered(MotorDirection),
    Fault(SensorError),
}

/// Turns the brightest lateral face toward X+, active in TEST_SIMPLE_ORIENT.
pub struct Orient<'a, D, F> {
    shared: &'a AdcsShared,
    power: u8,
    photodiodes: D,
    flywheel: F,
}

impl<'a, D: PhotodiodeArray, F: Flywheel> Orient<'a, D, F> {
    pub fn new(shared: &'a AdcsShared, config: &AdcsConfig, photodiodes: D, flywheel: F) -> Self {
        Self {
            shared,
            power: config.orient_power,
            photodiodes,
            flywheel,
        }
    }

    pub async fn cycle(&mut self) -> OrientOutcome {
        if self.shared.mode() != Mode::TestSimpleOrient {
            return OrientOutcome::Inactive;
        }
        let readings = match self.photodiodes.read_all().await {
            Ok(r) => r,
            Err(e) => {
                warn!("orient photodiodes: {:?}", e);
                return OrientOutcome::Fault(e);
            }
        };

        let direction = decide_direction(&readings);
        debug!("orient {:?}", direction);
        let (flywheel, power) = (&mut self.flywheel, self.power);
        let steered = self.shared.while_in(Mode::TestSimpleOrient, || match direction {
            MotorDirection::Idle => flywheel.stop(),
            dir => flywheel.run(dir, power),
        });
        match steered {
            Some(()) => OrientOutcome::Steered(direction),
            None => OrientOutcome::Inactive,
        }
    }
}
