use core::fmt::Write;

use embassy_stm32::usb_otg::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config, UsbDevice};
use static_cell::StaticCell;

use crate::state::DiagRecord;

bind_interrupts!(pub struct Irqs {
    OTG_FS => usb_otg::InterruptHandler<peripherals::USB_OTG_FS>;
});

pub type UsbDriver = Driver<'static, peripherals::USB_OTG_FS>;
pub type UsbSerial<'a> = CdcAcmClass<'a, UsbDriver>;

pub const DIAG_DEPTH: usize = 16;
pub type DiagReceiver = Receiver<'static, CriticalSectionRawMutex, DiagRecord, DIAG_DEPTH>;

struct UsbResources {
    config_desc: [u8; 256],
    bos_desc: [u8; 256],
    control_buf: [u8; 64],
    ep_out_buffer: [u8; 256],
    state: State<'static>,
}

static USB_RES: StaticCell<UsbResources> = StaticCell::new();

#[embassy_executor::task]
pub async fn usb_task(mut device: UsbDevice<'static, UsbDriver>) -> ! {
    device.run().await
}

pub fn init(
    usb_periph: peripherals::USB_OTG_FS,
    pa12: peripherals::PA12,
    pa11: peripherals::PA11,
) -> (UsbDevice<'static, UsbDriver>, UsbSerial<'static>) {
    let res = USB_RES.init(UsbResources {
        config_desc: [0; 256],
        bos_desc: [0; 256],
        control_buf: [0; 64],
        ep_out_buffer: [0; 256],
        state: State::new(),
    });

    let mut usb_config = usb_otg::Config::default();
    usb_config.vbus_detection = false;
    let driver = Driver::new_fs(usb_periph, Irqs, pa12, pa11, &mut res.ep_out_buffer, usb_config);

    let mut config = Config::new(0xc0de, 0xcafe);
    config.manufacturer = Some("ADCS");
    config.product = Some("ADCS debug console");
    config.serial_number = Some("00000001");

    let mut builder = Builder::new(
        driver,
        config,
        &mut res.config_desc,
        &mut res.bos_desc,
        &mut [], // msos_descs
        &mut res.control_buf,
    );
    let class = CdcAcmClass::new(&mut builder, &mut res.state, 64);
    let usb = builder.build();

    (usb, class)
}

/// Streams test capture as CSV lines while a host has the port open.
/// Records arriving with no host attached are dropped.
#[embassy_executor::task]
pub async fn console_task(mut serial: UsbSerial<'static>, diag: DiagReceiver) {
    loop {
        let record = diag.receive().await;
        if !serial.dtr() {
            continue;
        }

        let mut line = heapless::String::<96>::new();
        let _ = match record {
            DiagRecord::Bldc(s) => write!(line, "bldc,{},{},{}\r\n", s.t_ms, s.power, s.frequency),
            DiagRecord::Mtx(s) => write!(line, "mtx,{},{},{}\r\n", s.t_ms, s.power, s.frequency),
            DiagRecord::Photodiodes { t_ms, readings } => {
                let c = readings.channels;
                write!(
                    line,
                    "pd,{},{:.0},{:.0},{:.0},{:.0},{:.0},{:.0}\r\n",
                    t_ms, c[0], c[1], c[2], c[3], c[4], c[5]
                )
            }
        };
        // CDC packets are at most 64 bytes.
        for chunk in line.as_bytes().chunks(64) {
            if serial.write_packet(chunk).await.is_err() {
                break;
            }
        }
    }
}
