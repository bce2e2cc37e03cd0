#![no_std]
#![no_main]

mod board;
mod drivers;
mod state;
mod tasks;
mod usb;

use core::sync::atomic::AtomicU8;

use adcs_core::hal::{Flywheel, Magnetorquer};
use adcs_core::protocol::{ProtocolVersion, StatusCode};
use adcs_core::routines::send_status;
use adcs_core::{AdcsConfig, AdcsShared, SensorError, SharedActuator, SharedDevice};
use embassy_executor::Spawner;
use embassy_stm32::adc::{Adc, SampleTime};
use embassy_stm32::dma::NoDma;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, OutputType, Pin, Pull, Speed};
use embassy_stm32::i2c::I2c;
use embassy_stm32::spi::{Config as SpiConfig, Spi};
use embassy_stm32::time::Hertz as TimeHertz;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use embassy_stm32::timer::{Channel as PwmChannel, CountingMode};
use embassy_stm32::usart::Uart;
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_time::{Delay, Duration, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::board::Board;
use crate::drivers::drv10970::Drv10970;
use crate::drivers::hmc5883::Hmc5883;
use crate::drivers::icm42688::Icm42688;
use crate::drivers::imu::AdcsImu;
use crate::drivers::ina209::Ina209;
use crate::drivers::photodiode_mux::PhotodiodeMux;
use crate::drivers::tes_link::{RxEvent, TesRx, TesTx, RX_DEPTH, RX_RING_LEN};
use crate::drivers::zxmb5210::{MagnetorquerPair, Zxmb5210};
use crate::state::{DiagRecord, DownlinkHandle, I2cBus};
use crate::tasks::test_task::AttitudeSlot;
use crate::usb::DIAG_DEPTH;

// ── Shared state ──────────────────────────────────────────────────────────────
pub static SHARED: AdcsShared = AdcsShared::new();
pub static CONFIG: AdcsConfig = board::adcs_config();

/// Flywheel speed in rev/s, written by the FG counter.
pub static FLYWHEEL_RPS: AtomicU8 = AtomicU8::new(0);

//  Test capture for the USB console. Full means no host is draining it.
static DIAG_CHAN: Channel<CriticalSectionRawMutex, DiagRecord, DIAG_DEPTH> = Channel::new();
static TES_RX: Channel<CriticalSectionRawMutex, RxEvent, RX_DEPTH> = Channel::new();

static I2C_BUS: StaticCell<I2cBus> = StaticCell::new();
static FLYWHEEL: StaticCell<SharedActuator<Drv10970>> = StaticCell::new();
static MAGNETORQUERS: StaticCell<SharedActuator<MagnetorquerPair>> = StaticCell::new();
static PHOTODIODES: StaticCell<SharedDevice<PhotodiodeMux>> = StaticCell::new();
static TES_RX_RING: StaticCell<[u8; RX_RING_LEN]> = StaticCell::new();
static DOWNLINK: StaticCell<SharedDevice<TesTx>> = StaticCell::new();

// ── Interrupt bindings ────────────────────────────────────────────────────────
bind_interrupts!(struct Irqs {
    I2C1_EV  => embassy_stm32::i2c::EventInterruptHandler<peripherals::I2C1>;
    I2C1_ER  => embassy_stm32::i2c::ErrorInterruptHandler<peripherals::I2C1>;
    UART4    => embassy_stm32::usart::InterruptHandler<peripherals::UART4>;
});

/// Retry a sensor init under the configured policy.
macro_rules! bring_up {
    ($name:literal, $init:expr) => {{
        let mut attempt: u8 = 1;
        loop {
            match $init.await {
                Ok(()) => {
                    defmt::info!("{} ready", $name);
                    break Ok(());
                }
                Err(e) if attempt >= CONFIG.init.attempts => {
                    defmt::error!("{} failed after {} attempts: {:?}", $name, attempt, e);
                    break Err::<(), SensorError>(e);
                }
                Err(e) => {
                    defmt::warn!("{} attempt {}: {:?}", $name, attempt, e);
                    attempt += 1;
                    Timer::after_millis(CONFIG.init.retry_delay_ms).await;
                }
            }
        }
    }};
}

async fn announce(downlink: DownlinkHandle, status: StatusCode, version: ProtocolVersion) {
    let mut downlink = downlink;
    if let Err(e) = send_status(&mut downlink, status, version).await {
        defmt::warn!("announce {:?}: {:?}", status, e);
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    // 1. Board init (168 MHz PLL)
    let board = Board::init();
    let p = board.p;
    defmt::info!("adcs boot, protocol {:?}, checksum {}", CONFIG.protocol, CONFIG.validate_checksum);

    // 2. USB debug console
    let (usb_dev, usb_serial) = usb::init(p.USB_OTG_FS, p.PA12, p.PA11);
    spawner.spawn(usb::usb_task(usb_dev)).unwrap();
    spawner.spawn(usb::console_task(usb_serial, DIAG_CHAN.receiver())).unwrap();

    // 3. Actuators first, parked: flywheel on TIM3_CH3 (PB0), FR PB1, EN PA8
    let wheel_pwm = SimplePwm::new(
        p.TIM3,
        None,
        None,
        Some(PwmPin::new_ch3(p.PB0, OutputType::PushPull)),
        None,
        TimeHertz::khz(25),
        CountingMode::EdgeAlignedUp,
    );
    let fr = Output::new(p.PB1.degrade(), Level::Low, Speed::Low);
    let en = Output::new(p.PA8.degrade(), Level::Low, Speed::Low);
    let flywheel: &'static SharedActuator<Drv10970> = FLYWHEEL.init(SharedActuator::new(Drv10970::new(wheel_pwm, fr, en)));

    //    Magnetorquers: MTX1 on TIM8 CH3/CH4 (PC8/PC9), MTX2 on TIM12 CH1/CH2 (PB14/PB15), enable PA15
    let mtx1_pwm = SimplePwm::new(
        p.TIM8,
        None,
        None,
        Some(PwmPin::new_ch3(p.PC8, OutputType::PushPull)),
        Some(PwmPin::new_ch4(p.PC9, OutputType::PushPull)),
        TimeHertz::khz(20),
        CountingMode::EdgeAlignedUp,
    );
    let mtx2_pwm = SimplePwm::new(
        p.TIM12,
        Some(PwmPin::new_ch1(p.PB14, OutputType::PushPull)),
        Some(PwmPin::new_ch2(p.PB15, OutputType::PushPull)),
        None,
        None,
        TimeHertz::khz(20),
        CountingMode::EdgeAlignedUp,
    );
    let coils = MagnetorquerPair::new(
        Zxmb5210::new(mtx1_pwm, PwmChannel::Ch3, PwmChannel::Ch4),
        Zxmb5210::new(mtx2_pwm, PwmChannel::Ch1, PwmChannel::Ch2),
        Output::new(p.PA15.degrade(), Level::Low, Speed::Low),
    );
    let magnetorquers: &'static SharedActuator<MagnetorquerPair> = MAGNETORQUERS.init(SharedActuator::new(coils));
    flywheel.with(|fw| fw.stop());
    magnetorquers.with(|m| m.stop());

    //    FG tachometer on PC6
    let fg = ExtiInput::new(Input::new(p.PC6, Pull::Down), p.EXTI6);
    spawner.spawn(tasks::fg_task::fg_task(fg)).unwrap();

    // 4. TES link on UART4 @ 115200 8O1 (TX=PA0, RX=PA1)
    let uart = Uart::new(p.UART4, p.PA1, p.PA0, Irqs, p.DMA1_CH4, p.DMA1_CH2, board::tes_uart_config()).unwrap();
    let (uart_tx, uart_rx) = uart.split();
    let downlink: DownlinkHandle = DOWNLINK.init(SharedDevice::new(TesTx::new(uart_tx)));
    let uart_rx = uart_rx.into_ring_buffered(TES_RX_RING.init([0; RX_RING_LEN]));
    spawner
        .spawn(tasks::command_task::tes_rx_task(uart_rx, TES_RX.sender()))
        .unwrap();
    spawner
        .spawn(tasks::command_task::command_task(TesRx::new(TES_RX.receiver()), downlink, flywheel))
        .unwrap();

    // 5. Buses: I2C1 @ 400 kHz (SCL=PB8, SDA=PB9) for HMC5883L + INA209,
    //    SPI1 @ 10 MHz (SCK=PA5, MOSI=PA7, MISO=PA6, CS=PB12) for ICM-42688
    let i2c = I2c::new(
        p.I2C1,
        p.PB8,
        p.PB9,
        Irqs,
        p.DMA1_CH7,
        p.DMA1_CH0,
        TimeHertz(400_000),
        Default::default(),
    );
    let i2c_bus: &'static I2cBus = I2C_BUS.init(Mutex::new(i2c));

    let mut spi_config = SpiConfig::default();
    spi_config.frequency = TimeHertz(10_000_000);
    let spi = Spi::new(p.SPI1, p.PA5, p.PA7, p.PA6, NoDma, NoDma, spi_config);
    let cs_gyro = Output::new(p.PB12.degrade(), Level::High, Speed::VeryHigh);

    //    Photodiode mux: select PB3/PB4/PB5, analog PC0 on ADC1
    let mut adc = Adc::new(p.ADC1, &mut Delay);
    adc.set_sample_time(SampleTime::Cycles480);
    let select = [
        Output::new(p.PB3.degrade(), Level::Low, Speed::Low),
        Output::new(p.PB4.degrade(), Level::Low, Speed::Low),
        Output::new(p.PB5.degrade(), Level::Low, Speed::Low),
    ];
    let photodiodes: &'static SharedDevice<PhotodiodeMux> =
        PHOTODIODES.init(SharedDevice::new(PhotodiodeMux::new(adc, p.PC0, select)));

    // 6. Heartbeat LED (PC13)
    let mut led = Output::new(p.PC13, Level::High, Speed::Low);

    // 7. Sensor bring-up, bounded
    Timer::after(Duration::from_millis(100)).await;
    let mut imu = AdcsImu::new(Icm42688::new(spi, cs_gyro), Hmc5883::new(i2c_bus));
    let mut power = Ina209::new(i2c_bus);
    let imu_ok = bring_up!("imu", imu.init());
    let power_ok = bring_up!("ina209", power.init());

    if imu_ok.is_err() || power_ok.is_err() {
        // Degraded: commands still accepted, nothing sensor-driven runs.
        loop {
            announce(downlink, StatusCode::AdcsError, CONFIG.protocol).await;
            for _ in 0..10 {
                led.toggle();
                Timer::after(Duration::from_millis(100)).await;
            }
        }
    }

    // 8. Sensor-driven tasks
    let diag = DIAG_CHAN.sender();
    spawner.spawn(tasks::sampler_task::sampler_task(imu)).unwrap();
    spawner
        .spawn(tasks::heartbeat_task::heartbeat_task(
            power,
            photodiodes,
            flywheel,
            magnetorquers,
            downlink,
        ))
        .unwrap();
    spawner.spawn(tasks::control_task::detumble_task(flywheel)).unwrap();
    spawner
        .spawn(tasks::control_task::orient_task(photodiodes, flywheel))
        .unwrap();
    spawner
        .spawn(tasks::test_task::basic_motion_task(flywheel, downlink))
        .unwrap();
    spawner
        .spawn(tasks::test_task::bldc_task(flywheel, downlink, diag))
        .unwrap();
    spawner
        .spawn(tasks::test_task::mtx_task(magnetorquers, flywheel, downlink, diag))
        .unwrap();
    spawner
        .spawn(tasks::test_task::photodiode_task(photodiodes, diag))
        .unwrap();
    spawner
        .spawn(tasks::test_task::attitude_task(AttitudeSlot::Determination))
        .unwrap();
    spawner
        .spawn(tasks::test_task::attitude_task(AttitudeSlot::Control))
        .unwrap();

    announce(downlink, StatusCode::Hello, CONFIG.protocol).await;
    defmt::info!("adcs up");

    // 9. Main task: LED heartbeat @ 1 Hz
    loop {
        led.toggle();
        Timer::after(Duration::from_millis(500)).await;
    }
}
