use crate::{
    math::Fixed,
    renderer::{HALF_SCREEN_HEIGHT, PixelBuffer, Rgb565, SCREEN_HEIGHT, scale_rgb565},
};

/// Sky over the top half, a floor gradient over the bottom half.
///
/// The floor is brightest on the bottom row and fades toward the horizon by
/// `gradient` (0 = flat colour, 1 = black at the horizon).  Every band looks
/// the same before walls go in, so the whole thing is rendered once into a
/// band-sized template and copied.
pub struct Background {
    sky: Rgb565,
    floor: Rgb565,
    gradient: Fixed,
    template: PixelBuffer,
}

impl Default for Background {
    fn default() -> Self {
        Self::new(0x0000, 0x4208, 0.5)
    }
}

impl Background {
    pub fn new(sky: Rgb565, floor: Rgb565, gradient: f32) -> Self {
        let mut bg = Self {
            sky,
            floor,
            gradient: Fixed::ZERO,
            template: PixelBuffer::new(),
        };
        bg.gradient = clamp_gradient(gradient);
        bg.rebuild();
        bg
    }

    pub fn set_sky(&mut self, color: Rgb565) {
        self.sky = color;
        self.rebuild();
    }

    pub fn set_floor(&mut self, color: Rgb565) {
        self.floor = color;
        self.rebuild();
    }

    pub fn set_gradient(&mut self, gradient: f32) {
        self.gradient = clamp_gradient(gradient);
        self.rebuild();
    }

    pub fn sky(&self) -> Rgb565 {
        self.sky
    }

    pub fn floor(&self) -> Rgb565 {
        self.floor
    }

    pub fn template(&self) -> &PixelBuffer {
        &self.template
    }

    /// Colour of screen row `y` (0 = top).
    pub fn row_color(&self, y: usize) -> Rgb565 {
        if (y as i32) < HALF_SCREEN_HEIGHT {
            return self.sky;
        }
        let from_bottom = (SCREEN_HEIGHT - 1 - y) as i32;
        let fade = self.gradient.mul_int(from_bottom).div_int(HALF_SCREEN_HEIGHT);
        scale_rgb565(self.floor, Fixed::ONE - fade)
    }

    fn rebuild(&mut self) {
        for y in 0..PixelBuffer::HEIGHT {
            let c = self.row_color(y);
            for x in 0..PixelBuffer::WIDTH {
                self.template.set(x, y, c);
            }
        }
    }
}

fn clamp_gradient(g: f32) -> Fixed {
    Fixed::from_f32(g.clamp(0.0, 1.0))
}
