use core::sync::atomic::Ordering;

use adcs_core::hal::Flywheel;
use adcs_core::MotorDirection;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::TIM3;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::Channel;

use crate::FLYWHEEL_RPS;

const PWM_CHANNEL: Channel = Channel::Ch3;

/// DRV10970 sensorless BLDC driver behind the flywheel.
///
/// Speed is commanded as a PWM duty of `power / 255`. FR selects the
/// spin direction; the driver only latches FR while enabled, so direction
/// changes go through a disable/enable cycle.
pub struct Drv10970 {
    pwm: SimplePwm<'static, TIM3>,
    fr: Output<'static, AnyPin>,
    en: Output<'static, AnyPin>,
    direction: MotorDirection,
}

impl Drv10970 {
    pub fn new(mut pwm: SimplePwm<'static, TIM3>, fr: Output<'static, AnyPin>, en: Output<'static, AnyPin>) -> Self {
        pwm.set_duty(PWM_CHANNEL, 0);
        pwm.enable(PWM_CHANNEL);
        let mut drv = Self {
            pwm,
            fr,
            en,
            direction: MotorDirection::Idle,
        };
        drv.stop();
        drv
    }

    fn duty_for(&self, power: u8) -> u16 {
        (self.pwm.get_max_duty() as u32 * power as u32 / u8::MAX as u32) as u16
    }
}

impl Flywheel for Drv10970 {
    fn run(&mut self, direction: MotorDirection, power: u8) {
        if direction == MotorDirection::Idle {
            return self.stop();
        }
        if direction != self.direction {
            self.en.set_low();
            match direction {
                MotorDirection::Reverse => self.fr.set_high(),
                _ => self.fr.set_low(),
            }
            self.direction = direction;
        }
        let duty = self.duty_for(power);
        self.pwm.set_duty(PWM_CHANNEL, duty);
        self.en.set_high();
    }

    fn stop(&mut self) {
        self.pwm.set_duty(PWM_CHANNEL, 0);
        self.en.set_low();
        self.direction = MotorDirection::Idle;
    }

    fn frequency(&self) -> u8 {
        FLYWHEEL_RPS.load(Ordering::Relaxed)
    }

    fn is_enabled(&self) -> bool {
        self.direction != MotorDirection::Idle
    }
}
