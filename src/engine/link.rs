use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, SendError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, trace};

use crate::{
    display::{DisplaySink, DisplayWindow},
    engine::transfer::{
        Completion, CompletionSender, StartError, TransferEngine, check_len, completion,
    },
    renderer::PixelBuffer,
};

/*───────────────────────────────────────────────────────────────────────*/
/*                            Blocking link                              */
/*───────────────────────────────────────────────────────────────────────*/

/// Writes the band before `start` returns.  Never busy.
pub struct BlockingLink<S: DisplaySink> {
    sink: S,
    transfers: u64,
}

impl<S: DisplaySink> BlockingLink<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, transfers: 0 }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: DisplaySink> TransferEngine for BlockingLink<S> {
    fn start(
        &mut self,
        window: DisplayWindow,
        buffer: PixelBuffer,
    ) -> Result<Completion, StartError> {
        let buffer = check_len(buffer, self.max_transfer_len())?;
        self.sink.write_window(window, buffer.as_bytes());
        self.transfers += 1;
        trace!("blocking transfer #{} -> {:?}", self.transfers, window);
        Ok(Completion::ready(buffer))
    }

    fn is_busy(&self) -> bool {
        false
    }
}

/*───────────────────────────────────────────────────────────────────────*/
/*                            Threaded link                              */
/*───────────────────────────────────────────────────────────────────────*/

struct Job {
    window: DisplayWindow,
    buffer: PixelBuffer,
    done: CompletionSender,
}

/// A worker thread standing in for the DMA controller.
///
/// The busy flag drops *before* the completion fires, so whoever receives
/// the buffer back can start the next transfer straight away.
pub struct ThreadedLink {
    jobs: Option<Sender<Job>>,
    busy: Arc<AtomicBool>,
    transfers: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadedLink {
    pub fn spawn<S: DisplaySink + Send + 'static>(sink: S) -> io::Result<Self> {
        Self::with_throughput(sink, None)
    }

    /// Like [`spawn`](Self::spawn), but each transfer also takes as long as
    /// `bytes_per_sec` would need on the wire.
    pub fn with_throughput<S: DisplaySink + Send + 'static>(
        mut sink: S,
        bytes_per_sec: Option<u32>,
    ) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Job>();
        let busy = Arc::new(AtomicBool::new(false));
        let transfers = Arc::new(AtomicU64::new(0));

        let worker = {
            let busy = Arc::clone(&busy);
            let transfers = Arc::clone(&transfers);
            thread::Builder::new()
                .name("display-link".into())
                .spawn(move || {
                    for job in rx {
                        sink.write_window(job.window, job.buffer.as_bytes());
                        if let Some(rate) = bytes_per_sec.filter(|&r| r > 0) {
                            let secs = job.buffer.len_bytes() as f64 / rate as f64;
                            thread::sleep(Duration::from_secs_f64(secs));
                        }
                        transfers.fetch_add(1, Ordering::Relaxed);
                        busy.store(false, Ordering::Release);
                        job.done.complete(job.buffer);
                    }
                    debug!("display link worker exiting");
                })?
        };

        Ok(Self {
            jobs: Some(tx),
            busy,
            transfers,
            worker: Some(worker),
        })
    }

    /// Transfers finished so far.
    pub fn transfers(&self) -> u64 {
        self.transfers.load(Ordering::Relaxed)
    }
}

impl TransferEngine for ThreadedLink {
    fn start(
        &mut self,
        window: DisplayWindow,
        buffer: PixelBuffer,
    ) -> Result<Completion, StartError> {
        let buffer = check_len(buffer, self.max_transfer_len())?;
        let Some(jobs) = &self.jobs else {
            return Err(StartError::Closed(buffer));
        };
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(StartError::Busy(buffer));
        }

        let (done, c) = completion();
        match jobs.send(Job {
            window,
            buffer,
            done,
        }) {
            Ok(()) => {
                trace!("queued transfer -> {:?}", window);
                Ok(c)
            }
            Err(SendError(job)) => {
                self.busy.store(false, Ordering::Release);
                Err(StartError::Closed(job.buffer))
            }
        }
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for ThreadedLink {
    fn drop(&mut self) {
        // closing the channel ends the worker loop
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
