use crate::config::AdcsConfig;
use crate::error::{AdcsError, ProtocolError};
use crate::hal::{CommandLink, Flywheel, TelemetrySink};
use crate::mode::{ModeSwitch, Transition};
use crate::protocol::{CommandFrame, StatusCode, MAX_COMMAND_LEN};
use crate::system::AdcsShared;

use super::send_status;

/// Largest chunk taken from the link in one read.
pub const LINK_CHUNK: usize = 2 * MAX_COMMAND_LEN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandOutcome {
    /// Nothing arrived and no frame is pending.
    Idle,
    /// Part of a frame is held for the next poll.
    Pending { received: usize },
    /// The last complete frame of this poll.
    Applied(Transition),
    /// A bad frame, a stale partial frame or a UART fault. COMM_ERROR was
    /// sent and the receive state reset.
    Rejected(AdcsError),
}

/// Drains the TES link and feeds complete command frames to the mode
/// switch.
///
/// Bytes are appended to one frame as they arrive, so a frame may span
/// several reads or several polls. A rejected frame also discards whatever
/// followed it on the link, which puts the next burst back on a frame
/// boundary.
pub struct CommandReceiver<'a, L, S, F: Flywheel> {
    config: &'a AdcsConfig,
    link: L,
    sink: S,
    switch: ModeSwitch<'a, F>,
    frame: CommandFrame,
    /// Poll time at which the pending frame last grew.
    last_byte_ms: u64,
}

impl<'a, L, S, F> CommandReceiver<'a, L, S, F>
where
    L: CommandLink,
    S: TelemetrySink,
    F: Flywheel,
{
    pub fn new(shared: &'a AdcsShared, config: &'a AdcsConfig, link: L, sink: S, flywheel: F) -> Self {
        Self {
            config,
            link,
            sink,
            switch: ModeSwitch::new(shared, flywheel),
            frame: CommandFrame::new(config.protocol),
            last_byte_ms: 0,
        }
    }

    pub async fn cycle(&mut self, now_ms: u64) -> CommandOutcome {
        match self.pump(now_ms).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("command rejected: {:?}", e);
                self.frame.clear();
                self.discard().await;
                if let Err(e) = send_status(&mut self.sink, StatusCode::CommError, self.config.protocol).await {
                    warn!("comm error report: {:?}", e);
                }
                CommandOutcome::Rejected(e)
            }
        }
    }

    async fn pump(&mut self, now_ms: u64) -> Result<CommandOutcome, AdcsError> {
        let mut outcome = CommandOutcome::Idle;
        let mut buf = [0u8; LINK_CHUNK];
        loop {
            let n = self.link.read_available(&mut buf).await?;
            if n == 0 {
                break;
            }
            self.last_byte_ms = now_ms;
            for &byte in &buf[..n] {
                if self.frame.append_byte(byte) {
                    let opcode = self.accept()?;
                    self.frame.clear();
                    outcome = CommandOutcome::Applied(self.switch.transition(opcode));
                }
            }
        }

        let received = self.frame.received();
        if received == 0 {
            return Ok(outcome);
        }
        if now_ms.saturating_sub(self.last_byte_ms) >= self.config.command_frame_timeout_ms {
            return Err(ProtocolError::Length {
                expected: self.frame.version().command_len(),
                actual: received,
            }
            .into());
        }
        match outcome {
            CommandOutcome::Idle => Ok(CommandOutcome::Pending { received }),
            applied => Ok(applied),
        }
    }

    fn accept(&self) -> Result<u16, ProtocolError> {
        if self.config.validate_checksum {
            self.frame.validate_checksum()?;
        }
        Ok(self.frame.opcode())
    }

    /// Drop what is left on the link, up to the first idle read.
    async fn discard(&mut self) {
        let mut buf = [0u8; LINK_CHUNK];
        while let Ok(n) = self.link.read_available(&mut buf).await {
            if n == 0 {
                break;
            }
        }
    }
}
