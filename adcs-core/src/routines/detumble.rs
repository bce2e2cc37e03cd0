use crate::config::AdcsConfig;
use crate::control::{DetumbleCommand, DetumbleController};
use crate::hal::Flywheel;
use crate::mode::Mode;
use crate::system::AdcsShared;

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetumbleOutcome {
    Inactive,
    /// No IMU sample since the last cycle.
    Stale,
    Applied(DetumbleCommand),
}

/// Closed loop on the body Z rate, active in TEST_SIMPLE_DETUMBLE.
pub struct Detumble<'a, F> {
    shared: &'a AdcsShared,
    flywheel: F,
    controller: DetumbleController,
    active: bool,
    last_seq: Option<u32>,
}

impl<'a, F: Flywheel> Detumble<'a, F> {
    pub fn new(shared: &'a AdcsShared, config: &AdcsConfig, flywheel: F) -> Self {
        Self {
            shared,
            flywheel,
            controller: DetumbleController::new(config.pid),
            active: false,
            last_seq: None,
        }
    }

    pub fn cycle(&mut self) -> DetumbleOutcome {
        let (mode, imu, seq) = self.shared.snapshot_with_seq();
        if mode != Mode::TestSimpleDetumble {
            if self.active {
                self.controller.reset();
                self.active = false;
                self.last_seq = None;
            }
            return DetumbleOutcome::Inactive;
        }
        self.active = true;
        if self.last_seq == Some(seq) {
            return DetumbleOutcome::Stale;
        }
        self.last_seq = Some(seq);

        let command = self.controller.update(imu.gyro[2]);
        let flywheel = &mut self.flywheel;
        let applied = self.shared.while_in(Mode::TestSimpleDetumble, || {
            if let DetumbleCommand::Drive { direction, power } = command {
                flywheel.run(direction, power);
            }
        });
        match applied {
            Some(()) => DetumbleOutcome::Applied(command),
            None => DetumbleOutcome::Inactive,
        }
    }
}
