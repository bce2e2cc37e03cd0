//! One work cycle per firmware task.
//!
//! Each routine owns its collaborators and exposes `cycle()` (or `step()`
//! for the BLDC ramp). The firmware wraps it in a ticker loop; tests call
//! it directly. Routines check the shared mode themselves and do nothing
//! outside their trigger mode.

mod attitude;
mod bldc;
mod command;
mod detumble;
mod heartbeat;
mod motion;
mod mtx;
mod orient;
mod photodiode;

pub use attitude::AttitudePlaceholder;
pub use bldc::{BldcRamp, BldcSample, BldcStep};
pub use command::{CommandOutcome, CommandReceiver, LINK_CHUNK};
pub use detumble::{Detumble, DetumbleOutcome};
pub use heartbeat::{Heartbeat, HeartbeatOutcome};
pub use motion::{BasicMotion, MotionOutcome};
pub use mtx::{MtxOutcome, MtxSample, MtxTest};
pub use orient::{Orient, OrientOutcome};
pub use photodiode::{PhotodiodeOutcome, PhotodiodeTest};

use crate::error::LinkError;
use crate::hal::TelemetrySink;
use crate::protocol::{ProtocolVersion, StatusCode, TelemetryFrame};

/// Send a frame that carries only `status`.
pub async fn send_status<S: TelemetrySink>(
    sink: &mut S,
    status: StatusCode,
    version: ProtocolVersion,
) -> Result<(), LinkError> {
    let frame = TelemetryFrame::status_only(status, version).encode(version);
    sink.send(frame.as_bytes()).await
}
