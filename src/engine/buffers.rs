use std::time::Duration;

use log::{trace, warn};

use crate::{
    display::DisplayWindow,
    engine::transfer::{Completion, StartError, TransferEngine, TransferError},
    renderer::PixelBuffer,
};

enum Back {
    Idle(PixelBuffer),
    InFlight { band: usize, completion: Completion },
}

/// Two band buffers: one being drawn (the *front*), one out on the link or
/// waiting to be reused (the *back*).
///
/// [`present`](Self::present) is the only swap point.  It first waits for
/// the back buffer to come home, then hands the front buffer to the link and
/// makes the reclaimed one the new front.  The link owns whatever it is
/// sending, so the render side cannot write into an in-flight buffer.
pub struct DoubleBuffer {
    front: PixelBuffer,
    back: Option<Back>,
    timeout: Duration,
    replaced: u64,
}

impl DoubleBuffer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            front: PixelBuffer::new(),
            back: Some(Back::Idle(PixelBuffer::new())),
            timeout,
            replaced: 0,
        }
    }

    pub fn front(&self) -> &PixelBuffer {
        &self.front
    }

    pub fn front_mut(&mut self) -> &mut PixelBuffer {
        &mut self.front
    }

    /// Band currently owned by the link, if any.
    pub fn in_flight(&self) -> Option<usize> {
        match &self.back {
            Some(Back::InFlight { band, .. }) => Some(*band),
            _ => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Buffers allocated to replace ones lost to a stalled link.
    pub fn replaced(&self) -> u64 {
        self.replaced
    }

    /// Ship the front buffer as band `band` and swap.
    ///
    /// On error the frame is short one band but the manager is left with two
    /// usable buffers, so the next call can proceed.
    pub fn present<L: TransferEngine + ?Sized>(
        &mut self,
        band: usize,
        link: &mut L,
    ) -> Result<(), TransferError> {
        let next = self.take_back()?;
        let outgoing = std::mem::replace(&mut self.front, next);
        let window = DisplayWindow::for_band(band);

        let outgoing = match link.start(window, outgoing) {
            Ok(completion) => return self.launched(band, completion),
            Err(StartError::Busy(buf)) => buf,
            Err(e) => return Err(self.refused(band, e)),
        };

        // something we no longer track is still on the wire
        if !link.wait_idle(self.timeout) {
            self.back = Some(Back::Idle(outgoing));
            return Err(TransferError::Busy {
                band,
                timeout: self.timeout,
            });
        }
        match link.start(window, outgoing) {
            Ok(completion) => self.launched(band, completion),
            Err(e) => Err(self.refused(band, e)),
        }
    }

    /// Wait for the in-flight band, if any, and park its buffer.
    pub fn flush(&mut self) -> Result<(), TransferError> {
        let buf = self.take_back()?;
        self.back = Some(Back::Idle(buf));
        Ok(())
    }

    fn launched(&mut self, band: usize, completion: Completion) -> Result<(), TransferError> {
        trace!("band {band} handed to link");
        self.back = Some(Back::InFlight { band, completion });
        Ok(())
    }

    fn refused(&mut self, band: usize, e: StartError) -> TransferError {
        let (err, buf) = e.into_parts(band, self.timeout);
        warn!("{err}");
        self.back = Some(Back::Idle(buf));
        err
    }

    /// Take the back buffer out, waiting for the link if it has it.
    ///
    /// A buffer the link fails to return is written off and replaced, so
    /// `back` is never left empty on the error path.
    fn take_back(&mut self) -> Result<PixelBuffer, TransferError> {
        match self.back.take() {
            Some(Back::Idle(buf)) => Ok(buf),
            Some(Back::InFlight { band, completion }) => {
                match completion.wait(band, self.timeout) {
                    Ok(buf) => Ok(buf),
                    Err(err) => {
                        warn!("{err}; replacing the lost buffer");
                        self.replaced += 1;
                        self.back = Some(Back::Idle(PixelBuffer::new()));
                        Err(err)
                    }
                }
            }
            None => Ok(PixelBuffer::new()),
        }
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::transfer::{CompletionSender, completion};

    /// Keeps every buffer it is given and only returns them on demand.
    #[derive(Default)]
    struct ManualLink {
        pending: Vec<(CompletionSender, PixelBuffer)>,
        started: Vec<(DisplayWindow, *const u8)>,
    }

    impl ManualLink {
        fn finish_all(&mut self) {
            for (done, buf) in self.pending.drain(..) {
                done.complete(buf);
            }
        }
    }

    impl TransferEngine for ManualLink {
        fn start(
            &mut self,
            window: DisplayWindow,
            buffer: PixelBuffer,
        ) -> Result<Completion, StartError> {
            if !self.pending.is_empty() {
                return Err(StartError::Busy(buffer));
            }
            self.started.push((window, buffer.as_bytes().as_ptr()));
            let (done, c) = completion();
            self.pending.push((done, buffer));
            Ok(c)
        }

        fn is_busy(&self) -> bool {
            !self.pending.is_empty()
        }
    }

    #[test]
    fn buffers_alternate_and_never_alias() {
        let mut db = DoubleBuffer::new(Duration::from_millis(50));
        let mut link = ManualLink::default();

        let a = db.front().as_bytes().as_ptr();
        db.present(0, &mut link).unwrap();
        assert_eq!(db.in_flight(), Some(0));
        let b = db.front().as_bytes().as_ptr();
        assert_ne!(a, b);

        // the link still owns `a`; drawing goes to `b`
        assert_eq!(link.started[0].1, a);

        link.finish_all();
        db.present(1, &mut link).unwrap();
        assert_eq!(link.started[1].1, b);
        assert_eq!(db.front().as_bytes().as_ptr(), a);
        assert_eq!(link.started[1].0, DisplayWindow::for_band(1));
    }

    #[test]
    fn stalled_link_times_out_and_recovers() {
        let mut db = DoubleBuffer::new(Duration::from_millis(10));
        let mut link = ManualLink::default();

        db.present(0, &mut link).unwrap();
        // never finished: the next present must give up, not hang
        let err = db.present(1, &mut link).unwrap_err();
        assert!(matches!(err, TransferError::Timeout { band: 0, .. }));
        assert_eq!(db.replaced(), 1);
        assert_eq!(db.in_flight(), None);

        // the link is still wedged on band 0
        let err = db.present(1, &mut link).unwrap_err();
        assert!(matches!(err, TransferError::Busy { band: 1, .. }));

        // once it frees up everything works again
        link.pending.clear();
        db.present(1, &mut link).unwrap();
        assert_eq!(db.in_flight(), Some(1));
    }

    #[test]
    fn flush_reclaims_the_last_band() {
        let mut db = DoubleBuffer::new(Duration::from_millis(50));
        let mut link = ManualLink::default();
        db.present(3, &mut link).unwrap();
        link.finish_all();
        db.flush().unwrap();
        assert_eq!(db.in_flight(), None);
        assert_eq!(db.replaced(), 0);
    }
}
