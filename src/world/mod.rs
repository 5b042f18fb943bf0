mod camera;
mod map;
mod sprite;
mod texture;

pub use camera::{Camera, FOV_RATIO};

pub use map::{MAP_HEIGHT, MAP_WIDTH, MapError, TileId, TileMap, Tiles};

pub use sprite::{FULL_SCALE, MAX_SPRITES, Sprite, SpriteId, SpriteTable};

pub use texture::{Image, TextureError, TextureSet, WallTexture};
