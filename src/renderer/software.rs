//! ---------------------------------------------------------------------------
//! Fixed-point software renderer
//!
//! * Draws one band at a time into a [`Band`]; nothing here knows about the
//!   transfer link.
//! * The depth buffer spans the whole screen and is reset once per frame, so
//!   a band only ever reads the columns it wrote itself.
//! * Pass order inside a band: background copy, walls, sprites.  Overlays
//!   live in [`crate::renderer::overlay`].
//! ---------------------------------------------------------------------------

mod background;
pub mod raycaster;
pub mod sprites;

pub use background::Background;

use crate::{
    math::Fixed,
    renderer::{Band, SCREEN_WIDTH},
};

/*───────────────────────────────────────────────────────────────────────*/
/*                            Depth buffer                               */
/*───────────────────────────────────────────────────────────────────────*/

/// Perpendicular wall distance per screen column.  Columns whose ray found
/// no wall hold [`Fixed::MAX`], so every sprite is in front of them.
pub struct DepthBuffer([Fixed; SCREEN_WIDTH]);

impl Default for DepthBuffer {
    fn default() -> Self {
        Self([Fixed::MAX; SCREEN_WIDTH])
    }
}

impl DepthBuffer {
    pub fn reset(&mut self) {
        self.0.fill(Fixed::MAX);
    }

    #[inline(always)]
    pub fn get(&self, x: usize) -> Fixed {
        self.0[x]
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, depth: Fixed) {
        self.0[x] = depth;
    }

    pub fn as_slice(&self) -> &[Fixed] {
        &self.0
    }
}

/*───────────────────────────────────────────────────────────────────────*/
/*                              Backend                                  */
/*───────────────────────────────────────────────────────────────────────*/

/// Band renderer: walls by DDA raycasting, sprites as depth-tested
/// billboards, both over a precomputed sky/floor background.
#[derive(Default)]
pub struct Software {
    pub(crate) depth: DepthBuffer,
    background: Background,
}

impl Software {
    pub fn new(background: Background) -> Self {
        Self {
            depth: DepthBuffer::default(),
            background,
        }
    }

    /// Forget last frame's wall distances.
    pub fn begin_frame(&mut self) {
        self.depth.reset();
    }

    /// Paint the background into a fresh band.
    pub fn clear_band(&self, band: &mut Band) {
        band.pixels_mut().copy_from(self.background.template());
    }

    pub fn depth(&self) -> &DepthBuffer {
        &self.depth
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn background_mut(&mut self) -> &mut Background {
        &mut self.background
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
