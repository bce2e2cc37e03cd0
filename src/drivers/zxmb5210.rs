use adcs_core::hal::{Coil, Magnetorquer};
use adcs_core::MotorDirection;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::{TIM12, TIM8};
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::{CaptureCompare16bitInstance, Channel};

/// One ZXMB5210 H-bridge driving a magnetorquer coil. F and R are both PWM
/// channels of the same timer; at most one is non-zero.
pub struct Zxmb5210<T: CaptureCompare16bitInstance> {
    pwm: SimplePwm<'static, T>,
    forward: Channel,
    reverse: Channel,
    energized: bool,
}

impl<T: CaptureCompare16bitInstance> Zxmb5210<T> {
    pub fn new(mut pwm: SimplePwm<'static, T>, forward: Channel, reverse: Channel) -> Self {
        for ch in [forward, reverse] {
            pwm.set_duty(ch, 0);
            pwm.enable(ch);
        }
        Self {
            pwm,
            forward,
            reverse,
            energized: false,
        }
    }

    fn drive(&mut self, direction: MotorDirection, power: u8) {
        let duty = (self.pwm.get_max_duty() as u32 * power as u32 / u8::MAX as u32) as u16;
        let (on, off) = match direction {
            MotorDirection::Forward => (self.forward, self.reverse),
            MotorDirection::Reverse => (self.reverse, self.forward),
            MotorDirection::Idle => return self.release(),
        };
        self.pwm.set_duty(off, 0);
        self.pwm.set_duty(on, duty);
        self.energized = duty > 0;
    }

    fn release(&mut self) {
        self.pwm.set_duty(self.forward, 0);
        self.pwm.set_duty(self.reverse, 0);
        self.energized = false;
    }
}

/// Both coils plus their shared bridge enable.
pub struct MagnetorquerPair {
    mtx1: Zxmb5210<TIM8>,
    mtx2: Zxmb5210<TIM12>,
    enable: Output<'static, AnyPin>,
}

impl MagnetorquerPair {
    pub fn new(mtx1: Zxmb5210<TIM8>, mtx2: Zxmb5210<TIM12>, mut enable: Output<'static, AnyPin>) -> Self {
        enable.set_low();
        Self { mtx1, mtx2, enable }
    }
}

impl Magnetorquer for MagnetorquerPair {
    fn drive(&mut self, coil: Coil, direction: MotorDirection, power: u8) {
        match coil {
            Coil::One => self.mtx1.drive(direction, power),
            Coil::Two => self.mtx2.drive(direction, power),
        }
        if self.mtx1.energized || self.mtx2.energized {
            self.enable.set_high();
        } else {
            self.enable.set_low();
        }
    }

    fn stop(&mut self) {
        self.mtx1.release();
        self.mtx2.release();
        self.enable.set_low();
    }

    fn is_enabled(&self, coil: Coil) -> bool {
        match coil {
            Coil::One => self.mtx1.energized,
            Coil::Two => self.mtx2.energized,
        }
    }
}
