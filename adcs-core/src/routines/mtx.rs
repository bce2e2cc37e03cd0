use crate::config::AdcsConfig;
use crate::hal::{Coil, Flywheel, Magnetorquer, TelemetrySink};
use crate::mode::Mode;
use crate::protocol::StatusCode;
use crate::state::MotorDirection;
use crate::system::AdcsShared;

use super::send_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MtxSample {
    pub t_ms: u32,
    pub power: u8,
    pub frequency: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MtxOutcome {
    Inactive,
    /// The mode was left; both coils were released.
    Released,
    Energized(MtxSample),
}

/// Drives both magnetorquer coils at a fixed power, active in TEST_MTX.
pub struct MtxTest<'a, M, F, S> {
    shared: &'a AdcsShared,
    config: &'a AdcsConfig,
    magnetorquer: M,
    flywheel: F,
    sink: S,
    active: bool,
}

impl<'a, M: Magnetorquer, F: Flywheel, S: TelemetrySink> MtxTest<'a, M, F, S> {
    pub fn new(shared: &'a AdcsShared, config: &'a AdcsConfig, magnetorquer: M, flywheel: F, sink: S) -> Self {
        Self {
            shared,
            config,
            magnetorquer,
            flywheel,
            sink,
            active: false,
        }
    }

    pub async fn cycle(&mut self, now_ms: u32) -> MtxOutcome {
        if self.shared.mode() != Mode::TestMtx {
            if self.active {
                self.magnetorquer.stop();
                self.active = false;
                info!("magnetorquers released");
                return MtxOutcome::Released;
            }
            return MtxOutcome::Inactive;
        }

        if !self.active {
            if let Err(e) = send_status(&mut self.sink, StatusCode::MtxTest, self.config.protocol).await {
                warn!("mtx marker: {:?}", e);
            }
            self.active = true;
        }

        let power = self.config.mtx_power;
        let magnetorquer = &mut self.magnetorquer;
        let energized = self.shared.while_in(Mode::TestMtx, || {
            for coil in Coil::BOTH {
                magnetorquer.drive(coil, MotorDirection::Forward, power);
            }
        });
        if energized.is_none() {
            return MtxOutcome::Inactive;
        }
        MtxOutcome::Energized(MtxSample {
            t_ms: now_ms,
            power,
            frequency: self.flywheel.frequency(),
        })
    }
}
