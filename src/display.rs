//! Host-side stand-in for the panel.
//!
//! The engine only ever emits "write these bytes into this address window";
//! a [`DisplaySink`] is whatever receives them.  [`Framebuffer`] decodes the
//! wire format back into a full-screen RGB565 image, which is what the viewer
//! shows and what the integration tests inspect.

use std::sync::{Arc, Mutex, PoisonError};

use byteorder::{BigEndian, ByteOrder};

use crate::renderer::{BAND_WIDTH, Rgb565, SCREEN_HEIGHT, SCREEN_WIDTH};

/// Inclusive panel address window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DisplayWindow {
    pub x0: u16,
    pub y0: u16,
    pub x1: u16,
    pub y1: u16,
}

impl DisplayWindow {
    /// Full-height window covering band `band`.
    pub fn for_band(band: usize) -> Self {
        let x0 = (band * BAND_WIDTH) as u16;
        Self {
            x0,
            y0: 0,
            x1: x0 + BAND_WIDTH as u16 - 1,
            y1: SCREEN_HEIGHT as u16 - 1,
        }
    }

    pub fn width(&self) -> usize {
        (self.x1 - self.x0) as usize + 1
    }

    pub fn height(&self) -> usize {
        (self.y1 - self.y0) as usize + 1
    }

    /// Bytes a transfer into this window carries.
    pub fn byte_len(&self) -> usize {
        self.width() * self.height() * 2
    }
}

/// Receiver of finished band transfers.
pub trait DisplaySink {
    /// `bytes` are RGB565 pixels, high byte first, filling `window` row by row.
    fn write_window(&mut self, window: DisplayWindow, bytes: &[u8]);
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn write_window(&mut self, window: DisplayWindow, bytes: &[u8]) {
        (**self).write_window(window, bytes);
    }
}

/// Shared sink: the link thread writes, the UI thread reads.
impl<S: DisplaySink + ?Sized> DisplaySink for Arc<Mutex<S>> {
    fn write_window(&mut self, window: DisplayWindow, bytes: &[u8]) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_window(window, bytes);
    }
}

/// Full-screen panel memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pixels: Vec<Rgb565>,
    writes: u64,
}

pub type SharedFramebuffer = Arc<Mutex<Framebuffer>>;

impl Default for Framebuffer {
    fn default() -> Self {
        Self {
            pixels: vec![0; SCREEN_WIDTH * SCREEN_HEIGHT],
            writes: 0,
        }
    }
}

impl Framebuffer {
    pub fn shared() -> SharedFramebuffer {
        Arc::new(Mutex::new(Self::default()))
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb565 {
        self.pixels[y * SCREEN_WIDTH + x]
    }

    /// Row-major, `SCREEN_WIDTH × SCREEN_HEIGHT`.
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels
    }

    /// Number of windows written so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl DisplaySink for Framebuffer {
    fn write_window(&mut self, window: DisplayWindow, bytes: &[u8]) {
        let w = window.width();
        for (i, px) in bytes.chunks_exact(2).enumerate() {
            let x = window.x0 as usize + i % w;
            let y = window.y0 as usize + i / w;
            if x >= SCREEN_WIDTH || y > window.y1 as usize || y >= SCREEN_HEIGHT {
                break;
            }
            self.pixels[y * SCREEN_WIDTH + x] = BigEndian::read_u16(px);
        }
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_windows_tile_the_screen() {
        let w = DisplayWindow::for_band(3);
        assert_eq!((w.x0, w.x1, w.y0, w.y1), (120, 159, 0, 127));
        assert_eq!(w.byte_len(), 40 * 128 * 2);
    }

    #[test]
    fn framebuffer_decodes_high_byte_first() {
        let mut fb = Framebuffer::default();
        let window = DisplayWindow {
            x0: 10,
            y0: 5,
            x1: 11,
            y1: 6,
        };
        fb.write_window(window, &[0x12, 0x34, 0xAB, 0xCD, 0x00, 0x01, 0xFF, 0xFF]);
        assert_eq!(fb.pixel(10, 5), 0x1234);
        assert_eq!(fb.pixel(11, 5), 0xABCD);
        assert_eq!(fb.pixel(10, 6), 0x0001);
        assert_eq!(fb.pixel(11, 6), 0xFFFF);
        assert_eq!(fb.pixel(12, 5), 0);
        assert_eq!(fb.writes(), 1);
    }

    #[test]
    fn shared_sink_writes_through() {
        let fb = Framebuffer::shared();
        let mut sink = fb.clone();
        sink.write_window(DisplayWindow::for_band(0), &[0xF8, 0x00]);
        assert_eq!(fb.lock().unwrap().pixel(0, 0), 0xF800);
    }
}
