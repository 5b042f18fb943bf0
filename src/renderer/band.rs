use std::fmt;
use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};

use super::{BAND_WIDTH, Rgb565, SCREEN_HEIGHT};

/// One band's worth of pixels, row-major, stored the way the panel wants
/// them on the wire: two bytes per pixel, high byte first.
///
/// A buffer is either being drawn into or owned by the transfer link, never
/// both; handing it to the link moves it.
pub struct PixelBuffer {
    bytes: Box<[u8]>,
}

impl PixelBuffer {
    pub const WIDTH: usize = BAND_WIDTH;
    pub const HEIGHT: usize = SCREEN_HEIGHT;
    pub const PIXELS: usize = Self::WIDTH * Self::HEIGHT;
    pub const BYTES: usize = Self::PIXELS * 2;

    /// Zeroed (black) buffer.
    pub fn new() -> Self {
        Self {
            bytes: vec![0u8; Self::BYTES].into_boxed_slice(),
        }
    }

    #[inline(always)]
    fn offset(x: usize, y: usize) -> usize {
        (y * Self::WIDTH + x) * 2
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, color: Rgb565) {
        let i = Self::offset(x, y);
        BigEndian::write_u16(&mut self.bytes[i..i + 2], color);
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> Rgb565 {
        let i = Self::offset(x, y);
        BigEndian::read_u16(&self.bytes[i..i + 2])
    }

    /// Overwrite every pixel with `other`'s.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        self.bytes.copy_from_slice(&other.bytes);
    }

    pub fn fill(&mut self, color: Rgb565) {
        let [hi, lo] = color.to_be_bytes();
        for px in self.bytes.chunks_exact_mut(2) {
            px[0] = hi;
            px[1] = lo;
        }
    }

    /// Wire bytes, ready for the link.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len_bytes(&self) -> usize {
        self.bytes.len()
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("at", &self.bytes.as_ptr())
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Drawing target for one band: a [`PixelBuffer`] plus the screen columns
/// it covers.
///
/// Passes address it with *screen* columns; writes outside the band are
/// dropped, so callers never clip horizontally themselves.
pub struct Band<'a> {
    index: usize,
    pixels: &'a mut PixelBuffer,
}

impl<'a> Band<'a> {
    pub fn new(index: usize, pixels: &'a mut PixelBuffer) -> Self {
        Self { index, pixels }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// First screen column of the band.
    #[inline]
    pub fn x_start(&self) -> usize {
        self.index * BAND_WIDTH
    }

    /// One past the last screen column.
    #[inline]
    pub fn x_end(&self) -> usize {
        self.x_start() + BAND_WIDTH
    }

    #[inline]
    pub fn columns(&self) -> Range<usize> {
        self.x_start()..self.x_end()
    }

    /// Write at screen coordinates; silently ignored outside the band.
    #[inline(always)]
    pub fn put(&mut self, screen_x: i32, y: i32, color: Rgb565) {
        let x0 = self.x_start() as i32;
        if screen_x < x0 || screen_x >= x0 + BAND_WIDTH as i32 {
            return;
        }
        if y < 0 || y >= SCREEN_HEIGHT as i32 {
            return;
        }
        self.pixels.set((screen_x - x0) as usize, y as usize, color);
    }

    /// Write at band-local coordinates already known to be in range.
    #[inline(always)]
    pub fn put_local(&mut self, local_x: usize, y: usize, color: Rgb565) {
        self.pixels.set(local_x, y, color);
    }

    pub fn get(&self, screen_x: usize, y: usize) -> Rgb565 {
        self.pixels.get(screen_x - self.x_start(), y)
    }

    pub fn pixels_mut(&mut self) -> &mut PixelBuffer {
        self.pixels
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
