#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::{AdcsConfig, RampProfile};
use crate::control::{RampPhase, RampPoint};
use crate::hal::{Flywheel, TelemetrySink};
use crate::mode::{Mode, ModeSwitch};
use crate::protocol::{ProtocolVersion, StatusCode};
use crate::state::MotorDirection;
use crate::system::AdcsShared;

use super::send_status;

/// One diagnostic line of the ramp: elapsed time, commanded power and
/// measured wheel frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BldcSample {
    pub t_ms: u32,
    pub power: u8,
    pub frequency: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BldcStep {
    Inactive,
    Running(BldcSample),
    /// The mode changed under a running ramp.
    Aborted,
    /// Profile complete; the ramp handed the mode back to HEARTBEAT.
    Finished,
}

/// Quintic speed ramp for the flywheel, active in TEST_BLDC.
///
/// `step` is called with a monotonic millisecond clock as fast as the
/// caller likes; the first active call starts the profile.
pub struct BldcRamp<'a, F: Flywheel + Copy, S> {
    shared: &'a AdcsShared,
    profile: RampProfile,
    version: ProtocolVersion,
    flywheel: F,
    switch: ModeSwitch<'a, F>,
    sink: S,
    started_at: Option<u32>,
}

impl<'a, F: Flywheel + Copy, S: TelemetrySink> BldcRamp<'a, F, S> {
    pub fn new(shared: &'a AdcsShared, config: &AdcsConfig, flywheel: F, sink: S) -> Self {
        Self {
            shared,
            profile: config.ramp,
            version: config.protocol,
            flywheel,
            switch: ModeSwitch::new(shared, flywheel),
            sink,
            started_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub async fn step(&mut self, now_ms: u32) -> BldcStep {
        let mode = self.shared.mode();
        let start = match self.started_at {
            Some(start) if mode == Mode::TestBldc => start,
            Some(_) => {
                info!("bldc ramp aborted by {:?}", mode);
                self.started_at = None;
                return BldcStep::Aborted;
            }
            None if mode == Mode::TestBldc => {
                self.announce(StatusCode::MotorTest).await;
                info!("bldc ramp start, {} ms", self.profile.total_ms());
                self.started_at = Some(now_ms);
                now_ms
            }
            None => return BldcStep::Inactive,
        };

        let t_ms = now_ms.wrapping_sub(start);
        let RampPoint { phase, speed } = self.profile.at(t_ms);
        if phase == RampPhase::Done {
            self.flywheel.stop();
            self.announce(StatusCode::TestEnd).await;
            self.started_at = None;
            self.switch.transition_to(Mode::Heartbeat);
            return BldcStep::Finished;
        }

        let power = speed.round() as u8;
        let flywheel = &mut self.flywheel;
        let driven = self.shared.while_in(Mode::TestBldc, || {
            flywheel.run(MotorDirection::Forward, power);
            flywheel.frequency()
        });
        match driven {
            Some(frequency) => BldcStep::Running(BldcSample {
                t_ms,
                power,
                frequency,
            }),
            None => {
                self.started_at = None;
                BldcStep::Aborted
            }
        }
    }

    async fn announce(&mut self, status: StatusCode) {
        if let Err(e) = send_status(&mut self.sink, status, self.version).await {
            warn!("bldc marker: {:?}", e);
        }
    }
}
