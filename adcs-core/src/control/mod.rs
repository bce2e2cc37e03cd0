//! Control laws. Pure functions and small state machines with no I/O.

pub mod orient;
pub mod pid;
pub mod ramp;

pub use orient::{brightest_lateral, decide_direction, direction_for};
pub use pid::{DetumbleCommand, DetumbleController};
pub use ramp::{smoothstep, RampPhase, RampPoint};
