use glam::Vec2;
use log::debug;
use thiserror::Error;

pub const MAP_WIDTH: usize = 24;
pub const MAP_HEIGHT: usize = 24;

/// Tile id 0 is open floor; anything ≥ 1 is a wall using texture `id - 1`.
pub type TileId = u8;

/// Row-major tile grid: `tiles[row][col]`, row = map Y, col = map X.
pub type Tiles = [[TileId; MAP_WIDTH]; MAP_HEIGHT];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// `load_from_list` was given an index past the end of the list.
    #[error("map index {index} out of range ({len} maps)")]
    BadIndex { index: usize, len: usize },
}

/// The world grid the raycaster walks.
///
/// The border is expected to be solid; the engine does not check it.  A ray
/// that leaves through a gap simply draws no wall for that column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    tiles: Tiles,
}

impl Default for TileMap {
    fn default() -> Self {
        Self {
            tiles: [[0; MAP_WIDTH]; MAP_HEIGHT],
        }
    }
}

impl TileMap {
    pub fn new(tiles: &Tiles) -> Self {
        Self { tiles: *tiles }
    }

    /// Replace the whole grid.
    pub fn load(&mut self, tiles: &Tiles) {
        self.tiles = *tiles;
        debug!("map loaded ({} wall tiles)", self.wall_count());
    }

    /// Replace the whole grid with entry `index` of `maps`.
    pub fn load_from_list(&mut self, maps: &[&Tiles], index: usize) -> Result<(), MapError> {
        let tiles = maps.get(index).ok_or(MapError::BadIndex {
            index,
            len: maps.len(),
        })?;
        self.load(tiles);
        Ok(())
    }

    /// Tile at integer cell `(x, y)`, `None` outside the grid.
    #[inline(always)]
    pub fn tile(&self, x: i32, y: i32) -> Option<TileId> {
        if x < 0 || y < 0 || x >= MAP_WIDTH as i32 || y >= MAP_HEIGHT as i32 {
            return None;
        }
        Some(self.tiles[y as usize][x as usize])
    }

    /// Tile under a map-space point (truncated toward −∞).
    pub fn tile_at(&self, p: Vec2) -> Option<TileId> {
        self.tile(p.x.floor() as i32, p.y.floor() as i32)
    }

    /// True if `p` lies on open floor inside the grid.
    pub fn is_open(&self, p: Vec2) -> bool {
        self.tile_at(p) == Some(0)
    }

    pub fn tiles(&self) -> &Tiles {
        &self.tiles
    }

    fn wall_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|&&t| t != 0).count()
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;

    fn bordered() -> Tiles {
        let mut t = [[0; MAP_WIDTH]; MAP_HEIGHT];
        for i in 0..MAP_WIDTH {
            t[0][i] = 1;
            t[MAP_HEIGHT - 1][i] = 1;
        }
        for row in t.iter_mut() {
            row[0] = 1;
            row[MAP_WIDTH - 1] = 1;
        }
        t
    }

    #[test]
    fn row_major_lookup() {
        let mut tiles = bordered();
        tiles[3][7] = 5; // row 3 = y, col 7 = x
        let map = TileMap::new(&tiles);
        assert_eq!(map.tile(7, 3), Some(5));
        assert_eq!(map.tile(3, 7), Some(0));
        assert_eq!(map.tile_at(vec2(7.9, 3.2)), Some(5));
        assert_eq!(map.tile(-1, 0), None);
        assert_eq!(map.tile(0, MAP_HEIGHT as i32), None);
        assert!(map.is_open(vec2(12.5, 12.5)));
        assert!(!map.is_open(vec2(0.5, 12.5)));
    }

    #[test]
    fn load_from_list_replaces_wholesale() {
        let a = bordered();
        let mut b = [[0; MAP_WIDTH]; MAP_HEIGHT];
        b[1][1] = 9;
        let mut map = TileMap::new(&a);
        map.load_from_list(&[&a, &b], 1).unwrap();
        assert_eq!(map.tiles(), &b);
        assert_eq!(map.tile(0, 0), Some(0));
        assert_eq!(
            map.load_from_list(&[&a], 4),
            Err(MapError::BadIndex { index: 4, len: 1 })
        );
        assert_eq!(map.tiles(), &b);
    }
}
