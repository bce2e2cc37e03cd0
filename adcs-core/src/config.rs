//! Tunables shared by the firmware tasks.
//!
//! Everything is `const`-constructible so the firmware can keep its
//! configuration in a `static` and hand out `&'static AdcsConfig`.

use crate::protocol::ProtocolVersion;

/// Work-cycle periods in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPeriods {
    pub sampler_ms: u64,
    pub heartbeat_ms: u64,
    pub command_ms: u64,
    pub detumble_ms: u64,
    pub orient_ms: u64,
    pub motion_ms: u64,
    /// Step interval of a running BLDC ramp.
    pub bldc_ms: u64,
    pub photodiode_ms: u64,
    pub mtx_ms: u64,
    pub attitude_ms: u64,
}

impl TaskPeriods {
    pub const fn new() -> Self {
        Self {
            sampler_ms: 5,
            heartbeat_ms: 500,
            command_ms: 1000,
            detumble_ms: 10,
            orient_ms: 100,
            motion_ms: 2000,
            bldc_ms: 10,
            photodiode_ms: 10,
            mtx_ms: 1000,
            attitude_ms: 1000,
        }
    }
}

impl Default for TaskPeriods {
    fn default() -> Self {
        Self::new()
    }
}

/// Detumble controller gains. Integral and derivative are wired in but
/// default to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
    /// Magnitude clamp on the controller output, in flywheel power units.
    pub output_limit: f32,
}

impl PidGains {
    pub const fn new() -> Self {
        Self {
            kp: 1.0,
            ki: 0.0,
            kd: 0.0,
            output_limit: 255.0,
        }
    }
}

impl Default for PidGains {
    fn default() -> Self {
        Self::new()
    }
}

/// BLDC ramp test timing, in milliseconds, and plateau speed command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampProfile {
    /// Duration of each smoothstep segment (up and down).
    pub ramp_ms: u32,
    /// Time spent at `target` between the two ramps.
    pub plateau_ms: u32,
    /// Time spent at zero after the ramp down before the test ends.
    pub hold_ms: u32,
    pub target: f32,
}

impl RampProfile {
    pub const fn new() -> Self {
        Self {
            ramp_ms: 10_000,
            plateau_ms: 20_000,
            hold_ms: 10_000,
            target: 30.0,
        }
    }
}

impl Default for RampProfile {
    fn default() -> Self {
        Self::new()
    }
}

/// Sensor bring-up retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitPolicy {
    pub attempts: u8,
    pub retry_delay_ms: u64,
}

impl InitPolicy {
    pub const fn new() -> Self {
        Self {
            attempts: 10,
            retry_delay_ms: 500,
        }
    }
}

impl Default for InitPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdcsConfig {
    pub protocol: ProtocolVersion,
    /// Reject command frames whose CRC does not match.
    pub validate_checksum: bool,
    pub periods: TaskPeriods,
    pub pid: PidGains,
    pub ramp: RampProfile,
    /// Flywheel power used by the basic motion test.
    pub motion_power: u8,
    /// Flywheel power used while seeking the brightest photodiode.
    pub orient_power: u8,
    /// Coil power used by the magnetorquer test.
    pub mtx_power: u8,
    pub init: InitPolicy,
    /// Consecutive not-ready sampler cycles before a stall is reported.
    pub stall_threshold: u16,
    /// A partial command frame that gets no new bytes for this long is
    /// dropped with COMM_ERROR.
    pub command_frame_timeout_ms: u64,
}

impl AdcsConfig {
    pub const fn new() -> Self {
        Self {
            protocol: ProtocolVersion::Extended,
            validate_checksum: true,
            periods: TaskPeriods::new(),
            pid: PidGains::new(),
            ramp: RampProfile::new(),
            motion_power: 2,
            orient_power: 3,
            mtx_power: 128,
            init: InitPolicy::new(),
            stall_threshold: 200,
            command_frame_timeout_ms: 1000,
        }
    }

    pub const fn with_protocol(mut self, protocol: ProtocolVersion) -> Self {
        self.protocol = protocol;
        self
    }

    pub const fn with_checksum_validation(mut self, enabled: bool) -> Self {
        self.validate_checksum = enabled;
        self
    }
}

impl Default for AdcsConfig {
    fn default() -> Self {
        Self::new()
    }
}
