//! Open-loop speed profile for the BLDC ramp test.
//!
//! Up over `ramp_ms` along the quintic smoothstep, hold `target` for
//! `plateau_ms`, down along the mirrored curve, then sit at zero for
//! `hold_ms`. The quintic keeps value, slope and curvature continuous at
//! every segment boundary.

use crate::config::RampProfile;

/// 10t³ − 15t⁴ + 6t⁵ on t ∈ [0, 1]; clamped outside.
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampPhase {
    RampUp,
    Plateau,
    RampDown,
    Hold,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampPoint {
    pub phase: RampPhase,
    pub speed: f32,
}

impl RampProfile {
    /// Length of the whole test including the trailing hold.
    pub const fn total_ms(&self) -> u32 {
        2 * self.ramp_ms + self.plateau_ms + self.hold_ms
    }

    pub fn at(&self, t_ms: u32) -> RampPoint {
        let up_end = self.ramp_ms;
        let plateau_end = up_end + self.plateau_ms;
        let down_end = plateau_end + self.ramp_ms;

        let (phase, speed) = if t_ms < up_end {
            (RampPhase::RampUp, self.target * smoothstep(t_ms as f32 / self.ramp_ms as f32))
        } else if t_ms < plateau_end {
            (RampPhase::Plateau, self.target)
        } else if t_ms < down_end {
            let t = (t_ms - plateau_end) as f32 / self.ramp_ms as f32;
            (RampPhase::RampDown, self.target * (1.0 - smoothstep(t)))
        } else if t_ms < self.total_ms() {
            (RampPhase::Hold, 0.0)
        } else {
            (RampPhase::Done, 0.0)
        };
        RampPoint { phase, speed }
    }

    /// Speed at a fractional time, for sub-millisecond probing.
    pub fn speed_at(&self, t_ms: f32) -> f32 {
        let ramp = self.ramp_ms as f32;
        let plateau_end = ramp + self.plateau_ms as f32;
        if t_ms < ramp {
            self.target * smoothstep(t_ms / ramp)
        } else if t_ms < plateau_end {
            self.target
        } else {
            self.target * (1.0 - smoothstep((t_ms - plateau_end) / ramp))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert!((smoothstep(0.5) - 0.5).abs() < 1e-6);
        assert_eq!(smoothstep(-3.0), 0.0);
        assert_eq!(smoothstep(7.0), 1.0);
    }

    #[test]
    fn phases_follow_timeline() {
        let p = RampProfile::default();
        assert_eq!(p.total_ms(), 50_000);
        assert_eq!(p.at(0), RampPoint { phase: RampPhase::RampUp, speed: 0.0 });
        assert_eq!(p.at(10_000).phase, RampPhase::Plateau);
        assert_eq!(p.at(29_999).speed, 30.0);
        assert_eq!(p.at(30_000).phase, RampPhase::RampDown);
        assert_eq!(p.at(40_000), RampPoint { phase: RampPhase::Hold, speed: 0.0 });
        assert_eq!(p.at(50_000).phase, RampPhase::Done);
    }

    #[test]
    fn continuous_at_ramp_plateau_boundary() {
        let p = RampProfile::default();
        let b = p.ramp_ms as f32;
        let h = 0.5;

        let before = p.speed_at(b - 1e-3);
        let after = p.speed_at(b);
        assert!((before - after).abs() < 1e-3, "{} vs {}", before, after);

        let slope_before = (p.speed_at(b) - p.speed_at(b - h)) / h;
        let slope_after = (p.speed_at(b + h) - p.speed_at(b)) / h;
        assert!(slope_before.abs() < 1e-3, "slope before {}", slope_before);
        assert!((slope_before - slope_after).abs() < 1e-3);
    }

    #[test]
    fn continuous_at_plateau_down_boundary() {
        let p = RampProfile::default();
        let b = (p.ramp_ms + p.plateau_ms) as f32;
        let h = 0.5;
        assert!((p.speed_at(b - 1e-3) - p.speed_at(b)).abs() < 1e-3);
        let slope_after = (p.speed_at(b + h) - p.speed_at(b)) / h;
        assert!(slope_after.abs() < 1e-3);
    }
}
