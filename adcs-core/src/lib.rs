//! Hardware-free core of the ADCS firmware.
//!
//! Everything here runs identically on the STM32 target and on the host:
//! the TES packet codec, the mode state machine, the shared cells used to
//! hand data between tasks, the gyro filter, the control laws, and one
//! routine per firmware task that performs a single work cycle. The firmware
//! crate owns scheduling (tickers, timers) and the concrete drivers.
#![cfg_attr(not(test), no_std)]

#[macro_use]
mod macros;

pub mod cell;
pub mod config;
pub mod control;
pub mod error;
pub mod hal;
pub mod mode;
pub mod protocol;
pub mod routines;
pub mod sampler;
pub mod state;
pub mod system;

#[cfg(test)]
mod testing;

pub use cell::{DataCell, SharedActuator, SharedDevice};
pub use config::AdcsConfig;
pub use error::{AdcsError, LinkError, ProtocolError, SensorError};
pub use mode::{Mode, ModeSwitch, Transition};
pub use protocol::ProtocolVersion;
pub use state::*;
pub use system::AdcsShared;
