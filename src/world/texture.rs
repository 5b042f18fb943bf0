// Read-only wall textures and sprite images produced by the authoring tool.
// The raycaster only ever asks "which texture does tile N use".

use std::collections::HashSet;
use std::sync::Arc;

use crate::renderer::Rgb565;
use crate::world::map::TileId;

/// Slot of the checkerboard fallback; `TextureSet::new()` stores it first.
const FALLBACK: usize = 0;

/// Square wall texture, row-major RGB565, power-of-two side.
#[derive(Clone, Debug, PartialEq)]
pub struct WallTexture {
    pub name: String,
    pub resolution: usize,
    /// `resolution - 1`, used to wrap texture rows without a modulo.
    pub mask: usize,
    pub pixels: Vec<Rgb565>,
}

impl WallTexture {
    pub fn new<S: Into<String>>(
        name: S,
        resolution: usize,
        pixels: Vec<Rgb565>,
    ) -> Result<Self, TextureError> {
        if !resolution.is_power_of_two() {
            return Err(TextureError::NotPowerOfTwo(resolution));
        }
        if pixels.len() != resolution * resolution {
            return Err(TextureError::SizeMismatch {
                expected: resolution * resolution,
                got: pixels.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            resolution,
            mask: resolution - 1,
            pixels,
        })
    }

    /// `2^log2_res` square texture from a texel function `f(x, y)`.
    pub fn from_fn<S: Into<String>>(
        name: S,
        log2_res: u32,
        mut f: impl FnMut(usize, usize) -> Rgb565,
    ) -> Self {
        let resolution = 1usize << log2_res;
        let pixels = (0..resolution * resolution)
            .map(|i| f(i % resolution, i / resolution))
            .collect();
        Self {
            name: name.into(),
            resolution,
            mask: resolution - 1,
            pixels,
        }
    }

    /// Texel at column `u`, row `v` (both already in range).
    #[inline(always)]
    pub fn texel(&self, u: usize, v: usize) -> Rgb565 {
        self.pixels[v * self.resolution + u]
    }
}

/// Convenience checkerboard 8×8 (magenta/black).
impl Default for WallTexture {
    fn default() -> Self {
        const LIGHT: Rgb565 = 0xF81F;
        const DARK: Rgb565 = 0x0000;
        WallTexture::from_fn("CHECKER", 3, |x, y| if (x ^ y) & 1 == 0 { LIGHT } else { DARK })
    }
}

/// Immutable RGB565 image shared by world sprites and foreground overlays.
///
/// Cloning is cheap: the pixel data sits behind an `Arc`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pixels: Arc<[Rgb565]>,
    width: usize,
    height: usize,
}

impl Image {
    pub fn new(
        pixels: impl Into<Arc<[Rgb565]>>,
        width: usize,
        height: usize,
    ) -> Result<Self, TextureError> {
        let pixels = pixels.into();
        if width == 0 || height == 0 || pixels.len() != width * height {
            return Err(TextureError::SizeMismatch {
                expected: width * height,
                got: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Image from a pixel function `f(x, y)`; zero sizes are bumped to 1.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Rgb565) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let pixels: Arc<[Rgb565]> = (0..width * height).map(|i| f(i % width, i / width)).collect();
        Self {
            pixels,
            width,
            height,
        }
    }

    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height
    }

    /// One image row, `width` pixels long.
    #[inline(always)]
    pub fn row(&self, y: usize) -> &[Rgb565] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    #[inline(always)]
    pub fn pixel(&self, x: usize, y: usize) -> Rgb565 {
        self.pixels[y * self.width + x]
    }
}

/// Things that can go wrong when building textures or images.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in set")]
    Duplicate(String),

    /// Wall textures are indexed with a mask, so the side must be 2ⁿ.
    #[error("texture resolution {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// Pixel buffer length does not match the declared dimensions.
    #[error("expected {expected} pixels, got {got}")]
    SizeMismatch { expected: usize, got: usize },
}

/// Ordered collection of wall textures.
///
/// * Slot **0** is always the “missing” checkerboard.
/// * Wall tile `t ≥ 1` uses texture `1 + (t - 1) % count`, so any tile id
///   resolves to something drawable.
pub struct TextureSet {
    names: HashSet<String>,
    data: Vec<WallTexture>,
}

impl Default for TextureSet {
    fn default() -> Self {
        Self::new(WallTexture::default())
    }
}

impl TextureSet {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create a set holding only the fallback texture, stored under the
    /// fixed name `"MISSING"` in slot **0**.
    pub fn new(missing_tex: WallTexture) -> Self {
        Self {
            names: HashSet::from(["MISSING".to_owned()]),
            data: vec![missing_tex],
        }
    }

    /// Build a set from textures in tile order (first = tile 1).
    pub fn from_textures(
        textures: impl IntoIterator<Item = WallTexture>,
    ) -> Result<Self, TextureError> {
        let mut set = Self::default();
        for tex in textures {
            let name = tex.name.clone();
            set.insert(name, tex)?;
        }
        Ok(set)
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Only the checkerboard is present.
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    }

    /// Texture drawn for wall tile `tile` (tile 0 is never a wall; it maps
    /// to the fallback).
    #[inline]
    pub fn for_tile(&self, tile: TileId) -> &WallTexture {
        let walls = self.data.len() - 1;
        if walls == 0 || tile == 0 {
            return &self.data[FALLBACK];
        }
        &self.data[1 + (tile as usize - 1) % walls]
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`; it becomes the next tile texture.
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: WallTexture,
    ) -> Result<(), TextureError> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(TextureError::Duplicate(name));
        }
        self.names.insert(name);
        self.data.push(tex);
        Ok(())
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
