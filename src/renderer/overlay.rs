//! Per-frame overlays drawn on top of the 3-D view.
//!
//! Both queues are fixed-capacity and live for one frame: the engine draws
//! them into every band and clears them once the last band is out.  Pushing
//! into a full queue is a silent no-op (the caller gets `false`).

use smallvec::SmallVec;

use crate::{
    renderer::{
        Band, Rgb565, SCREEN_HEIGHT,
        font::{self, ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH},
    },
    world::{FULL_SCALE, Image},
};

/// Entries per queue and frame.
pub const MAX_OVERLAYS: usize = 8;
/// Characters kept from a queued string.
pub const MAX_TEXT_LEN: usize = 31;

/// A line of text, top-left anchored at `(x, y)` in screen pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextEntry {
    pub x: i32,
    pub y: i32,
    pub color: Rgb565,
    text: SmallVec<[u8; MAX_TEXT_LEN]>,
}

impl TextEntry {
    /// Keeps the first [`MAX_TEXT_LEN`] characters; anything that is not
    /// printable ASCII becomes `?`.
    pub fn new(x: i32, y: i32, text: &str, color: Rgb565) -> Self {
        let text = text
            .chars()
            .take(MAX_TEXT_LEN)
            .map(|c| if c.is_ascii_graphic() || c == ' ' { c as u8 } else { b'?' })
            .collect();
        Self { x, y, color, text }
    }

    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.text).unwrap_or_default()
    }

    pub fn draw(&self, band: &mut Band) {
        draw_text(band, self.x, self.y, &self.text, self.color);
    }
}

/// An image pinned to the screen (weapon, HUD art).
///
/// `(x, y)` is the bottom-centre of the image; its height is
/// `scale / FULL_SCALE` of the screen height, width follows the aspect.
#[derive(Clone, Debug, PartialEq)]
pub struct FgSprite {
    pub image: Image,
    pub x: i32,
    pub y: i32,
    pub scale: u8,
    pub transparent: Rgb565,
}

impl FgSprite {
    pub fn draw(&self, band: &mut Band) {
        let img = &self.image;
        // i64 throughout: the anchor may sit anywhere in i32
        let height = SCREEN_HEIGHT as i64 * self.scale as i64 / FULL_SCALE as i64;
        let width = height * img.width() as i64 / img.height() as i64;
        if height <= 0 || width <= 0 {
            return;
        }
        let bottom = self.y as i64;
        let top = bottom - height;
        let left = self.x as i64 - width / 2;

        let x_lo = left.max(band.x_start() as i64);
        let x_hi = (left + width).min(band.x_end() as i64);
        let y_lo = top.max(0);
        let y_hi = bottom.min(SCREEN_HEIGHT as i64);

        for y in y_lo..y_hi {
            let tex_y = ((y - top) * img.height() as i64 / height) as usize;
            let row = img.row(tex_y.min(img.height() - 1));
            for x in x_lo..x_hi {
                let tex_x = ((x - left) * img.width() as i64 / width) as usize;
                let px = row[tex_x.min(img.width() - 1)];
                if px != self.transparent {
                    band.put(x as i32, y as i32, px);
                }
            }
        }
    }
}

/// Draw ASCII bytes with the 5×7 font; pixels outside the band are dropped.
pub fn draw_text(band: &mut Band, x: i32, y: i32, text: &[u8], color: Rgb565) {
    let (band_lo, band_hi) = (band.x_start() as i64, band.x_end() as i64);
    let (x, y) = (x as i64, y as i64);
    if y >= SCREEN_HEIGHT as i64 || y + GLYPH_HEIGHT as i64 <= 0 {
        return;
    }
    if x >= band_hi || x + font::text_width(text.len()) as i64 <= band_lo {
        return;
    }
    for (i, &c) in text.iter().enumerate() {
        let cx = x + (i * ADVANCE) as i64;
        if cx >= band_hi {
            break;
        }
        if cx + GLYPH_WIDTH as i64 <= band_lo {
            continue;
        }
        let Some(glyph) = font::glyph(c) else {
            continue;
        };
        // both now lie within a glyph of the band
        for (col, bits) in glyph.iter().enumerate() {
            for row in 0..GLYPH_HEIGHT {
                if bits >> row & 1 != 0 {
                    band.put((cx + col as i64) as i32, (y + row as i64) as i32, color);
                }
            }
        }
    }
}

/// The two per-frame overlay queues.
#[derive(Default)]
pub struct OverlayQueue {
    texts: SmallVec<[TextEntry; MAX_OVERLAYS]>,
    sprites: SmallVec<[FgSprite; MAX_OVERLAYS]>,
}

impl OverlayQueue {
    pub fn push_text(&mut self, entry: TextEntry) -> bool {
        if self.texts.len() >= MAX_OVERLAYS {
            return false;
        }
        self.texts.push(entry);
        true
    }

    pub fn push_sprite(&mut self, sprite: FgSprite) -> bool {
        if self.sprites.len() >= MAX_OVERLAYS {
            return false;
        }
        self.sprites.push(sprite);
        true
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.sprites.is_empty()
    }

    /// Foreground sprites first, text on top.
    pub fn draw(&self, band: &mut Band) {
        for s in &self.sprites {
            s.draw(band);
        }
        for t in &self.texts {
            t.draw(band);
        }
    }

    pub fn clear(&mut self) {
        self.texts.clear();
        self.sprites.clear();
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::PixelBuffer;

    #[test]
    fn text_is_truncated_and_sanitised() {
        let long = "x".repeat(40);
        assert_eq!(TextEntry::new(0, 0, &long, 0).text().len(), MAX_TEXT_LEN);
        assert_eq!(TextEntry::new(0, 0, "hé\n", 0).text(), "h??");
    }

    #[test]
    fn queues_drop_past_capacity() {
        let mut q = OverlayQueue::default();
        for i in 0..MAX_OVERLAYS {
            assert!(q.push_text(TextEntry::new(0, i as i32 * 8, "hi", 0xFFFF)));
        }
        assert!(!q.push_text(TextEntry::new(0, 0, "nope", 0xFFFF)));
        assert!(!q.is_empty());
        q.clear();
        assert!(q.is_empty());
    }

    #[test]
    fn text_lands_in_the_right_band() {
        let mut buf = PixelBuffer::new();
        // '!' is a single column (the third) with rows 0..=4 and 6 set,
        // so drawn at x = 38 it lands on the first column of band 1
        let mut band = Band::new(1, &mut buf);
        draw_text(&mut band, 38, 10, b"!", 0x07E0);
        assert_eq!(band.get(40, 10), 0x07E0);
        assert_eq!(band.get(40, 14), 0x07E0);
        assert_eq!(band.get(40, 15), 0);
        assert_eq!(band.get(40, 16), 0x07E0);
        assert_eq!(band.get(41, 10), 0);

        let mut buf = PixelBuffer::new();
        let mut band = Band::new(0, &mut buf);
        draw_text(&mut band, 38, 10, b"!", 0x07E0);
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn foreground_sprite_is_bottom_anchored() {
        let img = Image::new(vec![0xFFFF, 0xF81F, 0xFFFF, 0xFFFF], 2, 2).unwrap();
        let fg = FgSprite {
            image: img,
            x: 60,
            y: 128,
            scale: 2,
            transparent: 0xF81F,
        };
        // 32 px tall, 32 px wide, columns 44..76, rows 96..128
        let mut buf = PixelBuffer::new();
        let mut band = Band::new(1, &mut buf);
        fg.draw(&mut band);
        assert_eq!(band.get(44, 127), 0xFFFF);
        assert_eq!(band.get(75, 96), 0);
        assert_eq!(band.get(59, 96), 0xFFFF);
        assert_eq!(band.get(44, 95), 0);
        assert_eq!(band.get(76, 127), 0);
    }

    #[test]
    fn extreme_anchors_are_clipped_not_overflowed() {
        let img = Image::new(vec![0xFFFF; 4], 2, 2).unwrap();
        let mut buf = PixelBuffer::new();
        let mut band = Band::new(0, &mut buf);
        for (x, y) in [
            (0, i32::MAX - 2),
            (0, i32::MIN),
            (i32::MAX, 0),
            (i32::MIN, 0),
            (i32::MAX, i32::MIN),
            (i32::MIN, i32::MAX),
        ] {
            draw_text(&mut band, x, y, b"HELLO", 0xFFFF);
            FgSprite {
                image: img.clone(),
                x,
                y,
                scale: u8::MAX,
                transparent: 0,
            }
            .draw(&mut band);
        }
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
    }
}
