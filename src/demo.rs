//! Built-in content: a small walled level, four procedural wall textures and
//! a few sprite images.  Used by the viewer and by tests that want a
//! realistic scene without asset files.

use once_cell::sync::Lazy;

use crate::{
    engine::{Engine, TransferEngine},
    renderer::{Rgb565, rgb565},
    world::{
        FULL_SCALE, Image, MAP_HEIGHT, MAP_WIDTH, TextureError, TextureSet, Tiles, WallTexture,
    },
};

/// Transparency key used by every demo image.
pub const KEY: Rgb565 = 0xF81F;

/// Eye position and heading the level is designed around.
pub const START_POS: (f32, f32) = (12.5, 12.5);
pub const START_DIR: (f32, f32) = (0.0, -1.0);

// '.' is open floor, digits are wall tiles.
const LAYOUT: [&str; MAP_HEIGHT] = [
    "111111111111111111111111",
    "1......................1",
    "1......................1",
    "1...22222......3.3.3...1",
    "1...2...2..............1",
    "1...2...2......3...3...1",
    "1...2...2..............1",
    "1...22.22......3.3.3...1",
    "1......................1",
    "1......................1",
    "1......................1",
    "1......................1",
    "1......................1",
    "1......................1",
    "1......................1",
    "1......................1",
    "144444444..............1",
    "14.4....4..............1",
    "14....3.4..............1",
    "14.4....4..............1",
    "14.444444..............1",
    "14.....................1",
    "144444444..............1",
    "111111111111111111111111",
];

static MAP: Lazy<Tiles> = Lazy::new(|| parse_layout(&LAYOUT));

fn parse_layout(rows: &[&str; MAP_HEIGHT]) -> Tiles {
    let mut tiles = [[0; MAP_WIDTH]; MAP_HEIGHT];
    for (row, line) in tiles.iter_mut().zip(rows) {
        for (cell, ch) in row.iter_mut().zip(line.bytes()) {
            *cell = match ch {
                b'1'..=b'9' => ch - b'0',
                _ => 0,
            };
        }
    }
    tiles
}

pub fn map() -> &'static Tiles {
    &MAP
}

/*──────────────────────── wall textures ─────────────────────────────*/

const TEX_LOG2: u32 = 4;

static WALL_TEXTURES: Lazy<Vec<WallTexture>> = Lazy::new(|| {
    vec![
        WallTexture::from_fn("BRICK", TEX_LOG2, |x, y| {
            let offset = if (y / 4) % 2 == 0 { 0 } else { 4 };
            if y % 4 == 3 || (x + offset) % 8 == 0 {
                rgb565(150, 150, 140)
            } else {
                rgb565(170 - (noise(x, y) & 31) as u8, 40, 30)
            }
        }),
        WallTexture::from_fn("STONE", TEX_LOG2, |x, y| {
            let v = 100 + (noise(x, y) & 63) as u8;
            rgb565(v, v, v + 10)
        }),
        WallTexture::from_fn("WOOD", TEX_LOG2, |x, y| {
            if x % 4 == 0 {
                rgb565(60, 35, 10)
            } else {
                let grain = ((y * 3 + x * 7) % 11) as u8 * 4;
                rgb565(140 + grain, 90 + grain / 2, 40)
            }
        }),
        // a big "F" on blue: mirrored faces are easy to spot
        WallTexture::from_fn("SIGN", TEX_LOG2, |x, y| {
            let stem = (3..6).contains(&x) && (3..13).contains(&y);
            let top = (3..12).contains(&x) && (3..6).contains(&y);
            let mid = (3..9).contains(&x) && (7..9).contains(&y);
            if stem || top || mid {
                rgb565(250, 230, 40)
            } else {
                rgb565(20, 40, 160)
            }
        }),
    ]
});

/// Deterministic per-texel jitter.
fn noise(x: usize, y: usize) -> u32 {
    let mut n = (x as u32).wrapping_mul(374_761_393) ^ (y as u32).wrapping_mul(668_265_263);
    n = (n ^ (n >> 13)).wrapping_mul(1_274_126_177);
    n ^ (n >> 16)
}

/// The demo wall textures, tile 1 = brick.
pub fn textures() -> Result<TextureSet, TextureError> {
    TextureSet::from_textures(WALL_TEXTURES.iter().cloned())
}

/*──────────────────────── sprite images ─────────────────────────────*/

pub static BARREL: Lazy<Image> = Lazy::new(|| {
    Image::from_fn(16, 16, |x, y| {
        let dx = x as i32 * 2 - 15;
        if dx.abs() > 11 || y < 2 {
            KEY
        } else if y % 5 == 2 {
            rgb565(90, 90, 90)
        } else {
            rgb565(40, 120 + (dx.unsigned_abs() * 4) as u8, 40)
        }
    })
});

pub static LAMP: Lazy<Image> = Lazy::new(|| {
    Image::from_fn(8, 32, |x, y| match y {
        0..=5 if (1..7).contains(&x) => rgb565(255, 240, 150),
        6..=29 if (3..5).contains(&x) => rgb565(60, 60, 70),
        30..=31 if (1..7).contains(&x) => rgb565(60, 60, 70),
        _ => KEY,
    })
});

/// First-person hand-held item, drawn as a foreground sprite.
pub static WEAPON: Lazy<Image> = Lazy::new(|| {
    Image::from_fn(16, 16, |x, y| {
        let barrel = (6..10).contains(&x) && y < 10;
        let grip = (4..12).contains(&x) && y >= 10;
        if barrel {
            rgb565(120, 120, 130)
        } else if grip {
            rgb565(80, 50, 30)
        } else {
            KEY
        }
    })
});

/// Sprite placements: `(x, y, image, scale)`.
fn placements() -> [(f32, f32, &'static Image, u8); 6] {
    [
        (12.5, 9.5, &*BARREL, FULL_SCALE / 2),
        (10.5, 8.5, &*BARREL, FULL_SCALE / 2),
        (14.5, 8.5, &*LAMP, FULL_SCALE),
        (6.5, 5.5, &*LAMP, FULL_SCALE),
        (18.5, 18.5, &*BARREL, FULL_SCALE / 2),
        (5.5, 18.5, &*BARREL, FULL_SCALE / 2),
    ]
}

/// Load the level, textures, sprites and start position into `engine`.
pub fn populate<L: TransferEngine>(engine: &mut Engine<L>) -> Result<(), TextureError> {
    engine.set_textures(textures()?);
    engine.map_mut().load(map());

    let cam = engine.camera_mut();
    cam.set_position(START_POS.0, START_POS.1);
    cam.set_direction(START_DIR.0, START_DIR.1);

    let sprites = engine.sprites_mut();
    sprites.clear_all();
    for (x, y, image, scale) in placements() {
        sprites.add(x, y, image.clone(), scale, KEY);
    }
    Ok(())
}
