//! UART4 link to the TES, split into a command receiver and a telemetry
//! transmitter.
//!
//! RX runs off a DMA ring buffer drained by `tes_rx_task`, which forwards
//! each burst into a channel. The command poll then picks up everything
//! that arrived since its last tick.

use adcs_core::hal::{CommandLink, TelemetrySink};
use adcs_core::routines::LINK_CHUNK;
use adcs_core::LinkError;
use embassy_stm32::peripherals::{DMA1_CH4, UART4};
use embassy_stm32::usart::{Error, UartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};

/// Bursts buffered between two command polls.
pub const RX_DEPTH: usize = 8;
/// DMA ring size for UART4 RX.
pub const RX_RING_LEN: usize = 64;

pub type RxSender = Sender<'static, CriticalSectionRawMutex, RxEvent, RX_DEPTH>;
pub type RxReceiver = Receiver<'static, CriticalSectionRawMutex, RxEvent, RX_DEPTH>;

pub fn link_error(e: Error) -> LinkError {
    match e {
        Error::Overrun => LinkError::Overrun,
        Error::Framing | Error::Noise => LinkError::Framing,
        Error::Parity => LinkError::Parity,
        _ => LinkError::Bus,
    }
}

#[derive(Clone, Copy)]
pub enum RxEvent {
    Bytes { buf: [u8; LINK_CHUNK], len: usize },
    Fault(LinkError),
}

impl RxEvent {
    pub fn bytes(data: &[u8]) -> Self {
        let len = data.len().min(LINK_CHUNK);
        let mut buf = [0u8; LINK_CHUNK];
        buf[..len].copy_from_slice(&data[..len]);
        Self::Bytes { buf, len }
    }
}

pub struct TesRx {
    events: RxReceiver,
}

impl TesRx {
    pub fn new(events: RxReceiver) -> Self {
        Self { events }
    }
}

impl CommandLink for TesRx {
    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        match self.events.try_receive() {
            Err(_) => Ok(0),
            Ok(RxEvent::Fault(e)) => Err(e),
            Ok(RxEvent::Bytes { buf: chunk, len }) => {
                let n = len.min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
        }
    }
}

pub struct TesTx {
    tx: UartTx<'static, UART4, DMA1_CH4>,
}

impl TesTx {
    pub fn new(tx: UartTx<'static, UART4, DMA1_CH4>) -> Self {
        Self { tx }
    }
}

impl TelemetrySink for TesTx {
    async fn send(&mut self, frame: &[u8]) -> Result<(), LinkError> {
        self.tx.write(frame).await.map_err(link_error)
    }
}
