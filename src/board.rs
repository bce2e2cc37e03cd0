use adcs_core::{AdcsConfig, ProtocolVersion};
use embassy_stm32::rcc::*;
use embassy_stm32::time::Hertz as TimeHertz;
use embassy_stm32::usart::{Config as UsartConfig, DataBits, Parity, StopBits};
use embassy_stm32::Config;

pub const TES_BAUD: u32 = 115_200;

pub struct Board {
    pub p: embassy_stm32::Peripherals,
}

impl Board {
    pub fn init() -> Self {
        let mut config = Config::default();
        config.rcc.hse = Some(Hse {
            freq: TimeHertz(8_000_000),
            mode: HseMode::Oscillator,
        });
        config.rcc.pll_src = PllSource::HSE;
        config.rcc.pll = Some(Pll {
            prediv: PllPreDiv::DIV4,
            mul: PllMul::MUL168,
            divp: Some(PllPDiv::DIV2), // 168 MHz
            divq: Some(PllQDiv::DIV7), // 48 MHz for USB
            divr: None,
        });
        config.rcc.sys = Sysclk::PLL1_P;
        config.rcc.ahb_pre = AHBPrescaler::DIV1;
        config.rcc.apb1_pre = APBPrescaler::DIV4;
        config.rcc.apb2_pre = APBPrescaler::DIV2;

        let p = embassy_stm32::init(config);

        Self { p }
    }
}

/// TES UART framing: 8 data bits, odd parity, 1 stop bit.
pub fn tes_uart_config() -> UsartConfig {
    let mut config = UsartConfig::default();
    config.baudrate = TES_BAUD;
    config.data_bits = DataBits::DataBits8;
    config.parity = Parity::ParityOdd;
    config.stop_bits = StopBits::STOP1;
    config
}

/// Build-time configuration, selected by cargo features.
pub const fn adcs_config() -> AdcsConfig {
    let protocol = if cfg!(feature = "compact-protocol") {
        ProtocolVersion::Compact
    } else {
        ProtocolVersion::Extended
    };
    AdcsConfig::new()
        .with_protocol(protocol)
        .with_checksum_validation(!cfg!(feature = "no-checksum"))
}
