#[allow(unused_imports)]
use micromath::F32Ext;

use crate::config::PidGains;
use crate::state::MotorDirection;

/// What the detumble loop should do with the flywheel this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DetumbleCommand {
    Drive { direction: MotorDirection, power: u8 },
    /// Zero rate error: leave the current command alone.
    Hold,
}

/// Drives the body Z rate to zero.
///
/// output = kp·e + ki·Σe + kd·(e − e_prev), with e = rate − 0. The
/// magnitude is clamped to `output_limit` and the sign picks the wheel
/// direction.
pub struct DetumbleController {
    gains: PidGains,
    integral: f32,
    prev_error: f32,
}

impl DetumbleController {
    pub const fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            prev_error: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = 0.0;
    }

    /// Raw controller output before clamping.
    pub fn output(&mut self, rate_z: f32) -> f32 {
        let error = rate_z;
        self.integral += error;
        let derivative = error - self.prev_error;
        self.prev_error = error;
        self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative
    }

    pub fn update(&mut self, rate_z: f32) -> DetumbleCommand {
        let error = rate_z;
        let output = self.output(rate_z);
        let power = output.abs().min(self.gains.output_limit).round() as u8;
        debug!("detumble e {} out {} pwr {}", error, output, power);

        if error > 0.0 {
            DetumbleCommand::Drive {
                direction: MotorDirection::Forward,
                power,
            }
        } else if error < 0.0 {
            DetumbleCommand::Drive {
                direction: MotorDirection::Reverse,
                power,
            }
        } else {
            DetumbleCommand::Hold
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportional_only_by_default() {
        let mut pid = DetumbleController::new(PidGains::default());
        assert_eq!(
            pid.update(12.4),
            DetumbleCommand::Drive {
                direction: MotorDirection::Forward,
                power: 12
            }
        );
        assert_eq!(
            pid.update(-3.0),
            DetumbleCommand::Drive {
                direction: MotorDirection::Reverse,
                power: 3
            }
        );
    }

    #[test]
    fn output_is_clamped() {
        let mut pid = DetumbleController::new(PidGains::default());
        assert_eq!(
            pid.update(-900.0),
            DetumbleCommand::Drive {
                direction: MotorDirection::Reverse,
                power: 255
            }
        );
    }

    #[test]
    fn zero_error_holds() {
        let mut pid = DetumbleController::new(PidGains::default());
        assert_eq!(pid.update(0.0), DetumbleCommand::Hold);
    }

    #[test]
    fn integral_and_derivative_are_wired() {
        let gains = PidGains {
            kp: 0.0,
            ki: 1.0,
            kd: 0.0,
            output_limit: 255.0,
        };
        let mut pid = DetumbleController::new(gains);
        pid.output(2.0);
        assert_eq!(pid.output(3.0), 5.0);

        let gains = PidGains {
            kp: 0.0,
            ki: 0.0,
            kd: 1.0,
            output_limit: 255.0,
        };
        let mut pid = DetumbleController::new(gains);
        pid.output(2.0);
        assert_eq!(pid.output(5.0), 3.0);
        pid.reset();
        assert_eq!(pid.output(1.0), 1.0);
    }
}
