use adcs_core::hal::PhotodiodeArray;
use adcs_core::{PdChannel, SensorError};
use embassy_stm32::adc::Adc;
use embassy_stm32::gpio::{AnyPin, Output};
use embassy_stm32::peripherals::{ADC1, PC0};
use embassy_time::Timer;

/// Settling time after switching the multiplexer.
const SETTLE_US: u64 = 10;

/// Six photodiodes behind a 3-bit analog multiplexer into ADC1.
/// Readings are raw 12-bit counts.
pub struct PhotodiodeMux {
    adc: Adc<'static, ADC1>,
    input: PC0,
    select: [Output<'static, AnyPin>; 3],
}

impl PhotodiodeMux {
    pub fn new(adc: Adc<'static, ADC1>, input: PC0, select: [Output<'static, AnyPin>; 3]) -> Self {
        Self { adc, input, select }
    }

    fn route(&mut self, channel: PdChannel) {
        let index = channel.index();
        for (bit, pin) in self.select.iter_mut().enumerate() {
            if index & (1 << bit) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
    }
}

impl PhotodiodeArray for PhotodiodeMux {
    async fn read_channel(&mut self, channel: PdChannel) -> Result<f32, SensorError> {
        self.route(channel);
        Timer::after_micros(SETTLE_US).await;
        Ok(self.adc.read(&mut self.input) as f32)
    }
}
