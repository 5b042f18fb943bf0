//! The seam between the renderer and whatever moves pixels to the panel.
//!
//! A transfer takes *ownership* of its [`PixelBuffer`] and gives it back
//! through a single-shot [`Completion`].  While the link holds a buffer
//! nothing else can touch it; there is no shared flag to forget to check.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::{display::DisplayWindow, renderer::PixelBuffer};

/// Largest single transfer the DMA channel accepts.
pub const MAX_TRANSFER_BYTES: usize = 65_535;

/// Why a band never made it to the panel (or never came back).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("band {band}: transfer did not complete within {timeout:?}")]
    Timeout { band: usize, timeout: Duration },

    #[error("band {band}: transfer link dropped the completion")]
    Disconnected { band: usize },

    #[error("band {band}: link still busy after {timeout:?}")]
    Busy { band: usize, timeout: Duration },

    #[error("band {band}: {len} bytes exceeds the {max}-byte transfer limit")]
    TooLong { band: usize, len: usize, max: usize },

    #[error("band {band}: transfer link is closed")]
    Closed { band: usize },
}

/// A refused start.  The buffer is always handed back.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("a transfer is already in progress")]
    Busy(PixelBuffer),

    #[error("{len} bytes exceeds the {max}-byte transfer limit")]
    TooLong {
        len: usize,
        max: usize,
        buffer: PixelBuffer,
    },

    #[error("transfer link is closed")]
    Closed(PixelBuffer),
}

impl StartError {
    pub fn into_buffer(self) -> PixelBuffer {
        match self {
            StartError::Busy(b) | StartError::Closed(b) => b,
            StartError::TooLong { buffer, .. } => buffer,
        }
    }

    /// Split into the frame-level error for `band` and the returned buffer.
    pub(crate) fn into_parts(self, band: usize, timeout: Duration) -> (TransferError, PixelBuffer) {
        match self {
            StartError::Busy(b) => (TransferError::Busy { band, timeout }, b),
            StartError::Closed(b) => (TransferError::Closed { band }, b),
            StartError::TooLong { len, max, buffer } => {
                (TransferError::TooLong { band, len, max }, buffer)
            }
        }
    }
}

/*──────────────────────── completion ──────────────────────────────*/

/// Link-side half of a completion.  Consumed by [`complete`], so it fires
/// at most once; dropping it unfired shows up as `Disconnected`.
///
/// [`complete`]: CompletionSender::complete
pub struct CompletionSender {
    tx: SyncSender<PixelBuffer>,
}

impl CompletionSender {
    /// Return the buffer to whoever started the transfer.
    pub fn complete(self, buffer: PixelBuffer) {
        // receiver gone means the transfer was abandoned; the buffer just drops
        let _ = self.tx.send(buffer);
    }
}

/// Render-side half: resolves to the buffer once the transfer is done.
#[derive(Debug)]
pub struct Completion {
    rx: Receiver<PixelBuffer>,
}

/// A connected sender/receiver pair for one transfer.
pub fn completion() -> (CompletionSender, Completion) {
    let (tx, rx) = mpsc::sync_channel(1);
    (CompletionSender { tx }, Completion { rx })
}

impl Completion {
    /// Already finished (synchronous links).
    pub fn ready(buffer: PixelBuffer) -> Self {
        let (tx, c) = completion();
        tx.complete(buffer);
        c
    }

    /// Block until the buffer comes back or `timeout` passes.
    pub fn wait(self, band: usize, timeout: Duration) -> Result<PixelBuffer, TransferError> {
        self.rx.recv_timeout(timeout).map_err(|e| match e {
            RecvTimeoutError::Timeout => TransferError::Timeout { band, timeout },
            RecvTimeoutError::Disconnected => TransferError::Disconnected { band },
        })
    }
}

/*──────────────────────── the trait ───────────────────────────────*/

/// Something that can push one band to the panel asynchronously.
pub trait TransferEngine {
    /// Begin moving `buffer` into `window`.
    ///
    /// One transfer at a time: starting while busy is refused with
    /// [`StartError::Busy`] and does not disturb the running transfer.
    fn start(&mut self, window: DisplayWindow, buffer: PixelBuffer)
    -> Result<Completion, StartError>;

    fn is_busy(&self) -> bool;

    fn max_transfer_len(&self) -> usize {
        MAX_TRANSFER_BYTES
    }

    /// Spin until idle.  `false` if still busy when `timeout` runs out.
    fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.is_busy() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::yield_now();
        }
        true
    }
}

impl<T: TransferEngine + ?Sized> TransferEngine for Box<T> {
    fn start(
        &mut self,
        window: DisplayWindow,
        buffer: PixelBuffer,
    ) -> Result<Completion, StartError> {
        (**self).start(window, buffer)
    }

    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }

    fn max_transfer_len(&self) -> usize {
        (**self).max_transfer_len()
    }

    fn wait_idle(&self, timeout: Duration) -> bool {
        (**self).wait_idle(timeout)
    }
}

/// Refuse oversized transfers before they reach hardware.
pub(crate) fn check_len(buffer: PixelBuffer, max: usize) -> Result<PixelBuffer, StartError> {
    let len = buffer.len_bytes();
    if len > max {
        return Err(StartError::TooLong { len, max, buffer });
    }
    Ok(buffer)
}
