use crate::{
    math::Fixed,
    renderer::{Band, HALF_SCREEN_HEIGHT, SCREEN_HEIGHT, SCREEN_WIDTH, Shade, Software},
    world::{Camera, MAP_HEIGHT, MAP_WIDTH, TextureSet, TileId, TileMap, WallTexture},
};

/// A ray that has not hit anything after this many cell steps is abandoned.
pub const MAX_RAY_STEPS: u32 = (MAP_WIDTH + MAP_HEIGHT) as u32;

/// Lower bound on the perpendicular distance; keeps the column height
/// division finite when the eye touches a wall.
const MIN_PERP_DIST: Fixed = Fixed::from_raw(256);

/// Which family of grid lines the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// A vertical grid line (constant X).
    X,
    /// A horizontal grid line (constant Y); drawn darker.
    Y,
}

impl Side {
    #[inline]
    pub fn shade(self) -> Shade {
        match self {
            Side::X => Shade::NONE,
            Side::Y => Shade::HALF,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RayHit {
    pub map_x: i32,
    pub map_y: i32,
    pub tile: TileId,
    pub side: Side,
    /// Distance to the wall measured along the view direction.
    pub perp_dist: Fixed,
    /// Where along the wall face the ray landed, `[0, 1)`.
    pub wall_x: Fixed,
    pub steps: u32,
}

/// Camera-space X of screen column `x`: −1 at the left edge, ~+1 at the right.
#[inline]
pub fn camera_x(x: usize) -> Fixed {
    Fixed::from_int(2 * x as i32).div_int(SCREEN_WIDTH as i32) - Fixed::ONE
}

/// Walk the grid from the camera's cell along `(ray_x, ray_y)`.
///
/// `None` when the ray leaves the map or runs out of steps.
pub fn cast_ray(cam: &Camera, map: &TileMap, ray_x: Fixed, ray_y: Fixed) -> Option<RayHit> {
    let (mut map_x, mut map_y) = cam.cell();

    let delta_x = delta_dist(ray_x);
    let delta_y = delta_dist(ray_y);

    let (step_x, mut side_x) = if ray_x.is_negative() {
        (-1, cam.pos_x.frac() * delta_x)
    } else {
        (1, (Fixed::ONE - cam.pos_x.frac()) * delta_x)
    };
    let (step_y, mut side_y) = if ray_y.is_negative() {
        (-1, cam.pos_y.frac() * delta_y)
    } else {
        (1, (Fixed::ONE - cam.pos_y.frac()) * delta_y)
    };

    for steps in 1..=MAX_RAY_STEPS {
        let side = if side_x < side_y {
            side_x += delta_x;
            map_x += step_x;
            Side::X
        } else {
            side_y += delta_y;
            map_y += step_y;
            Side::Y
        };

        let tile = match map.tile(map_x, map_y) {
            None => return None,
            Some(0) => continue,
            Some(t) => t,
        };

        let perp_dist = match side {
            Side::X => side_x - delta_x,
            Side::Y => side_y - delta_y,
        }
        .max(MIN_PERP_DIST);

        let wall_x = match side {
            Side::X => cam.pos_y + perp_dist * ray_y,
            Side::Y => cam.pos_x + perp_dist * ray_x,
        }
        .frac();

        return Some(RayHit {
            map_x,
            map_y,
            tile,
            side,
            perp_dist,
            wall_x,
            steps,
        });
    }
    None
}

/// Ray length between two grid lines of one family.
#[inline]
fn delta_dist(component: Fixed) -> Fixed {
    if component == Fixed::ZERO {
        Fixed::MAX
    } else {
        component.recip_precise().abs()
    }
}

/// On-screen height of a wall slice at `perp_dist`.
#[inline]
pub fn line_height(perp_dist: Fixed) -> i32 {
    (((SCREEN_HEIGHT as i64) << Fixed::SHIFT) / perp_dist.raw().max(1) as i64) as i32
}

impl Software {
    /// Cast one ray per column of `band` and draw the wall slices.
    ///
    /// Records every column's distance in the depth buffer (the sentinel
    /// when nothing was hit).  Returns the number of columns that hit a wall.
    pub fn draw_walls(
        &mut self,
        band: &mut Band,
        cam: &Camera,
        map: &TileMap,
        textures: &TextureSet,
    ) -> usize {
        let mut hits = 0;
        for x in band.columns() {
            let cx = camera_x(x);
            let ray_x = cam.dir_x + cam.plane_x * cx;
            let ray_y = cam.dir_y + cam.plane_y * cx;

            let Some(hit) = cast_ray(cam, map, ray_x, ray_y) else {
                self.depth.set(x, Fixed::MAX);
                continue;
            };

            self.depth.set(x, hit.perp_dist);
            let flip = match hit.side {
                Side::X => ray_x.is_negative(),
                Side::Y => ray_y > Fixed::ZERO,
            };
            draw_column(band, x - band.x_start(), &hit, flip, textures.for_tile(hit.tile));
            hits += 1;
        }
        hits
    }
}

/// Textured vertical slice.  `flip` mirrors the texture column so that
/// every face reads left-to-right when looked at from the front.
fn draw_column(band: &mut Band, local_x: usize, hit: &RayHit, flip: bool, tex: &WallTexture) {
    let height = line_height(hit.perp_dist);
    if height <= 0 {
        return;
    }
    let half = height >> 1;
    let start = (HALF_SCREEN_HEIGHT - half).max(0);
    let end = (HALF_SCREEN_HEIGHT + half).min(SCREEN_HEIGHT as i32);

    let res = tex.resolution as i32;
    let mut tex_x = ((hit.wall_x.raw() as i64 * res as i64) >> Fixed::SHIFT) as i32;
    if flip {
        tex_x = res - tex_x - 1;
    }
    let tex_x = tex_x.clamp(0, res - 1) as usize;

    // texture rows per screen row, starting where the clipped slice begins
    let step = Fixed::from_int(res).div_int(height);
    let mut tex_pos = step.mul_int(start - HALF_SCREEN_HEIGHT + half);

    let shade = hit.side.shade();
    for y in start..end {
        let tex_y = (tex_pos.raw() >> Fixed::SHIFT) as usize & tex.mask;
        tex_pos += step;
        band.put_local(local_x, y as usize, shade.apply(tex.texel(tex_x, tex_y)));
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::{Background, PixelBuffer},
        world::{Tiles, WallTexture},
    };
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

    fn near(a: Fixed, b: f64) -> bool {
        (a.to_f64() - b).abs() < 0.01
    }

    #[test]
    fn camera_x_spans_the_screen() {
        assert_eq!(camera_x(0), -Fixed::ONE);
        assert_eq!(camera_x(80), Fixed::ZERO);
        assert!(near(camera_x(159), 0.9875));
    }

    #[test]
    fn straight_ray_hits_the_north_wall() {
        let map = TileMap::new(&bordered());
        let cam = Camera::new(vec2(12.5, 12.5), vec2(0.0, -1.0));
        let hit = cast_ray(&cam, &map, cam.dir_x, cam.dir_y).unwrap();
        assert_eq!((hit.map_x, hit.map_y), (12, 0));
        assert_eq!(hit.side, Side::Y);
        assert!(near(hit.perp_dist, 11.5));
        assert!(near(hit.wall_x, 0.5));
    }

    #[test]
    fn x_side_hit_is_not_shaded() {
        let map = TileMap::new(&bordered());
        let cam = Camera::new(vec2(12.5, 12.5), vec2(1.0, 0.0));
        let hit = cast_ray(&cam, &map, cam.dir_x, cam.dir_y).unwrap();
        assert_eq!((hit.map_x, hit.side), (23, Side::X));
        assert!(near(hit.perp_dist, 10.5));
        assert_eq!(hit.side.shade(), Shade::NONE);
    }

    #[test]
    fn closed_map_hits_within_the_step_budget() {
        let map = TileMap::new(&bordered());
        let straight = Camera::new(vec2(12.5, 12.5), vec2(0.0, -1.0));
        let hit = cast_ray(&straight, &map, straight.dir_x, straight.dir_y).unwrap();
        assert_eq!(hit.steps, 12);

        for (px, py, deg) in [(1.5, 1.5, 0.0), (12.3, 12.7, 33.0), (22.5, 22.5, 200.0)] {
            let mut cam = Camera::new(vec2(px, py), vec2(0.0, -1.0));
            for turn in 0..8 {
                cam.rotate(deg + turn as f32 * 45.0);
                for x in 0..SCREEN_WIDTH {
                    let cx = camera_x(x);
                    let rx = cam.dir_x + cam.plane_x * cx;
                    let ry = cam.dir_y + cam.plane_y * cx;
                    let hit = cast_ray(&cam, &map, rx, ry).unwrap();
                    assert!(hit.steps >= 1 && hit.steps <= MAX_RAY_STEPS, "{hit:?}");
                }
            }
        }
    }

    #[test]
    fn ray_in_open_map_terminates() {
        let map = TileMap::new(&[[0; MAP_WIDTH]; MAP_HEIGHT]);
        let cam = Camera::new(vec2(12.3, 12.7), vec2(1.0, 1.0));
        for x in [0, 37, 80, 159] {
            let cx = camera_x(x);
            let rx = cam.dir_x + cam.plane_x * cx;
            let ry = cam.dir_y + cam.plane_y * cx;
            assert_eq!(cast_ray(&cam, &map, rx, ry), None);
        }
    }

    #[test]
    fn hugging_a_wall_clamps_distance() {
        let map = TileMap::new(&bordered());
        let cam = Camera::new(vec2(12.5, 1.0), vec2(0.0, -1.0));
        let hit = cast_ray(&cam, &map, cam.dir_x, cam.dir_y).unwrap();
        assert_eq!(hit.perp_dist, MIN_PERP_DIST);
        assert_eq!(line_height(hit.perp_dist), 128 * 256);
    }

    #[test]
    fn band_columns_fill_depth_and_pixels() {
        let map = TileMap::new(&bordered());
        let textures = TextureSet::from_textures([WallTexture::new("W", 2, vec![0xFFFF; 4]).unwrap()])
            .unwrap();
        let cam = Camera::new(vec2(12.5, 12.5), vec2(0.0, -1.0));

        let mut sw = Software::new(Background::new(0, 0, 0.0));
        sw.begin_frame();
        let mut buf = PixelBuffer::new();
        let mut band = Band::new(2, &mut buf);
        sw.clear_band(&mut band);
        let hits = sw.draw_walls(&mut band, &cam, &map, &textures);

        assert_eq!(hits, 40);
        assert!(near(sw.depth().get(80), 11.5));
        // other bands untouched
        assert_eq!(sw.depth().get(0), Fixed::MAX);

        // wall around the horizon, Y-side so half brightness, background above
        let h = line_height(sw.depth().get(80));
        assert_eq!(band.get(80, 64), 0x7BEF);
        assert_eq!(band.get(80, (64 - h / 2 - 1) as usize), 0);
    }

    #[test]
    fn texture_rows_run_top_to_bottom() {
        // 2×2 texture: top row red, bottom row blue
        let tex = WallTexture::new("RB", 2, vec![0xF800, 0xF800, 0x001F, 0x001F]).unwrap();
        let textures = TextureSet::from_textures([tex]).unwrap();
        let map = TileMap::new(&bordered());
        let cam = Camera::new(vec2(12.5, 20.5), vec2(1.0, 0.0));

        let mut sw = Software::default();
        let mut buf = PixelBuffer::new();
        let mut band = Band::new(2, &mut buf);
        sw.draw_walls(&mut band, &cam, &map, &textures);

        let h = line_height(sw.depth().get(80));
        let top = (64 - h / 2) as usize;
        let bottom = (64 + h / 2 - 1) as usize;
        assert_eq!(band.get(80, top), 0xF800);
        assert_eq!(band.get(80, bottom), 0x001F);
    }
}
