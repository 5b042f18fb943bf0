use std::time::{Duration, Instant};

/// Frames averaged for the displayed rate.
pub const FPS_WINDOW: usize = 16;

/// Rolling frame-rate estimate over the last [`FPS_WINDOW`] frame times.
#[derive(Default)]
pub struct FpsCounter {
    samples: [Duration; FPS_WINDOW],
    next: usize,
    filled: usize,
    last: Option<Instant>,
}

impl FpsCounter {
    /// Mark the start of a frame.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if let Some(prev) = self.last.replace(now) {
            self.samples[self.next] = now.saturating_duration_since(prev);
            self.next = (self.next + 1) % FPS_WINDOW;
            self.filled = (self.filled + 1).min(FPS_WINDOW);
        }
    }

    /// Frames per second, rounded down; 0 until two frames have been seen.
    pub fn fps(&self) -> u32 {
        let total: Duration = self.samples[..self.filled].iter().sum();
        let micros = total.as_micros();
        if micros == 0 {
            return 0;
        }
        (self.filled as u128 * 1_000_000 / micros) as u32
    }
}
