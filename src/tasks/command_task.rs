use adcs_core::routines::{CommandOutcome, CommandReceiver, LINK_CHUNK};
use embassy_executor::task;
use embassy_stm32::peripherals::{DMA1_CH2, UART4};
use embassy_stm32::usart::RingBufferedUartRx;
use embassy_time::{Duration, Instant, Ticker};

use crate::drivers::tes_link::{link_error, RxEvent, RxSender, TesRx};
use crate::state::{DownlinkHandle, FlywheelHandle};
use crate::{CONFIG, SHARED};

/// Keeps UART4 RX armed and forwards each burst to the command poll.
#[task]
pub async fn tes_rx_task(mut rx: RingBufferedUartRx<'static, UART4, DMA1_CH2>, events: RxSender) {
    let mut buf = [0u8; LINK_CHUNK];
    loop {
        let event = match rx.read(&mut buf).await {
            Ok(0) => continue,
            Ok(n) => RxEvent::bytes(&buf[..n]),
            Err(e) => RxEvent::Fault(link_error(e)),
        };
        events.send(event).await;
    }
}

/// Polls the TES link. Spawned before sensor bring-up and never stopped,
/// so the ADCS stays commandable even when sensors are missing.
#[task]
pub async fn command_task(rx: TesRx, downlink: DownlinkHandle, flywheel: FlywheelHandle) {
    let mut receiver = CommandReceiver::new(&SHARED, &CONFIG, rx, downlink, flywheel);
    let mut ticker = Ticker::every(Duration::from_millis(CONFIG.periods.command_ms));
    loop {
        match receiver.cycle(Instant::now().as_millis()).await {
            CommandOutcome::Applied(t) => defmt::debug!("command: {:?}", t),
            CommandOutcome::Rejected(e) => defmt::warn!("command: {:?}", e),
            _ => {}
        }
        ticker.next().await;
    }
}
