use crate::config::AdcsConfig;
use crate::error::LinkError;
use crate::hal::{Coil, Flywheel, Magnetorquer, PhotodiodeArray, PowerMonitor, TelemetrySink};
use crate::mode::Mode;
use crate::protocol::{ActuatorFlags, StatusCode, TelemetryFrame};
use crate::system::AdcsShared;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeartbeatOutcome {
    Silent(Mode),
    Sent,
    LinkFault(LinkError),
}

/// Periodic OK telemetry.
///
/// Sensor faults leave the affected field at zero; the frame still goes
/// out.
pub struct Heartbeat<'a, P, D, F, M, S> {
    shared: &'a AdcsShared,
    config: &'a AdcsConfig,
    power: P,
    photodiodes: D,
    flywheel: F,
    magnetorquer: M,
    sink: S,
    frame: TelemetryFrame,
}

impl<'a, P, D, F, M, S> Heartbeat<'a, P, D, F, M, S>
where
    P: PowerMonitor,
    D: PhotodiodeArray,
    F: Flywheel,
    M: Magnetorquer,
    S: TelemetrySink,
{
    pub fn new(
        shared: &'a AdcsShared,
        config: &'a AdcsConfig,
        power: P,
        photodiodes: D,
        flywheel: F,
        magnetorquer: M,
        sink: S,
    ) -> Self {
        Self {
            shared,
            config,
            power,
            photodiodes,
            flywheel,
            magnetorquer,
            sink,
            frame: TelemetryFrame::new(),
        }
    }

    pub async fn cycle(&mut self) -> HeartbeatOutcome {
        let version = self.config.protocol;
        let (mode, imu) = self.shared.snapshot();
        if !mode.emits_heartbeat() {
            return HeartbeatOutcome::Silent(mode);
        }

        self.frame.set_status(StatusCode::Ok, version);
        self.frame.set_imu(&imu);
        match self.power.read().await {
            Ok(power) => self.frame.set_power(&power),
            Err(e) => warn!("power monitor: {:?}", e),
        }
        match self.photodiodes.read_filtered().await {
            Ok(readings) => self.frame.set_photodiodes(&readings),
            Err(e) => warn!("photodiodes: {:?}", e),
        }
        self.frame.speed_rps = self.flywheel.frequency();
        self.frame.actuators = ActuatorFlags {
            flywheel: self.flywheel.is_enabled(),
            magnetorquer_1: self.magnetorquer.is_enabled(Coil::One),
            magnetorquer_2: self.magnetorquer.is_enabled(Coil::Two),
        };
        self.frame.mode = mode.opcode();

        let encoded = self.frame.encode(version);
        self.frame.clear();
        match self.sink.send(encoded.as_bytes()).await {
            Ok(()) => HeartbeatOutcome::Sent,
            Err(e) => {
                warn!("heartbeat send: {:?}", e);
                HeartbeatOutcome::LinkFault(e)
            }
        }
    }
}
