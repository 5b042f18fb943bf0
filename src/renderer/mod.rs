//! Rasterisation layer.
//!
//! *Nothing here talks to the display.*  Every pass writes into a [`Band`],
//! a view over one quarter-screen [`PixelBuffer`]; the engine decides when a
//! finished band is handed to the transfer link.
//!
//! * [`Software`] owns the per-frame state shared across bands (depth
//!   buffer, background template, scratch lists) and implements the wall
//!   and sprite passes.
//! * [`overlay`] draws the per-frame text and foreground-sprite queues.

mod band;
pub mod font;
pub mod overlay;
pub mod software;

pub use band::{Band, PixelBuffer};
pub use overlay::{FgSprite, OverlayQueue, TextEntry};
pub use software::{Background, DepthBuffer, Software};

/// 16-bit colour, 5-6-5 bits, as the panel consumes it.
pub type Rgb565 = u16;

pub const SCREEN_WIDTH: usize = 160;
pub const SCREEN_HEIGHT: usize = 128;
pub const HALF_SCREEN_WIDTH: i32 = (SCREEN_WIDTH / 2) as i32;
pub const HALF_SCREEN_HEIGHT: i32 = (SCREEN_HEIGHT / 2) as i32;

/// Vertical bands per frame; one band is one double-buffering unit.
pub const BAND_COUNT: usize = 4;
pub const BAND_WIDTH: usize = SCREEN_WIDTH / BAND_COUNT;

/// Pack 8-bit channels into 5-6-5 (red in the high bits).
#[inline]
pub const fn rgb565(r: u8, g: u8, b: u8) -> Rgb565 {
    ((r as u16 & 0xF8) << 8) | ((g as u16 & 0xFC) << 3) | (b as u16 >> 3)
}

/// Expand to `0x00RRGGBB` for a desktop window.
#[inline]
pub fn to_rgb888(c: Rgb565) -> u32 {
    let r = ((c >> 11) & 0x1F) as u32;
    let g = ((c >> 5) & 0x3F) as u32;
    let b = (c & 0x1F) as u32;
    ((r << 3 | r >> 2) << 16) | ((g << 2 | g >> 4) << 8) | (b << 3 | b >> 2)
}

/// Multiply each channel by `factor` (Q16.16, clamped to `[0, 1]`).
///
/// Channel order does not matter: the 5/6/5 fields are scaled in place.
pub fn scale_rgb565(c: Rgb565, factor: crate::math::Fixed) -> Rgb565 {
    let f = factor.raw().clamp(0, crate::math::Fixed::ONE.raw()) as u32;
    let lo = ((c & 0x1F) as u32 * f) >> 16;
    let mid = (((c >> 5) & 0x3F) as u32 * f) >> 16;
    let hi = (((c >> 11) & 0x1F) as u32 * f) >> 16;
    ((hi << 11) | (mid << 5) | lo) as Rgb565
}

/// Per-column darkening, chosen once per column and applied to every pixel
/// of it as `(c >> shift) & mask`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shade {
    pub mask: Rgb565,
    pub shift: u32,
}

impl Shade {
    pub const NONE: Shade = Shade {
        mask: 0xFFFF,
        shift: 0,
    };
    /// Halves every channel; the mask drops the bit that leaks in from the
    /// neighbouring field.
    pub const HALF: Shade = Shade {
        mask: 0x7BEF,
        shift: 1,
    };

    #[inline(always)]
    pub fn apply(self, c: Rgb565) -> Rgb565 {
        (c >> self.shift) & self.mask
    }
}
