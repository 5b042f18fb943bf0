use smallvec::SmallVec;

use crate::{
    math::Fixed,
    renderer::{
        BAND_WIDTH, Band, HALF_SCREEN_HEIGHT, HALF_SCREEN_WIDTH, SCREEN_HEIGHT, Software,
    },
    world::{Camera, FULL_SCALE, MAX_SPRITES, Sprite, SpriteTable},
};

/// Sprites closer than 0.1 along the view axis are culled.
const NEAR_PLANE: Fixed = Fixed::from_raw(6_554);

/// Screen-space placement of one billboard.
///
/// `top`/`left` are *unclipped*; texture coordinates are derived from them
/// so a sprite half off-screen still shows the right half of its image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisSprite {
    /// Camera-space depth, compared against the wall depth buffer.
    pub depth: Fixed,
    pub screen_x: i32,
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
}

/// A sprite column that survived the depth test.
#[derive(Clone, Copy)]
struct VisibleColumn {
    x: i32,
    tex_x: usize,
}

/// Project a sprite through the inverse camera matrix.
///
/// `None` when it is behind (or nearly on) the eye, or collapses to nothing.
pub fn project(cam: &Camera, sprite: &Sprite) -> Option<VisSprite> {
    let sx = sprite.x - cam.pos_x;
    let sy = sprite.y - cam.pos_y;

    let det = cam.plane_x * cam.dir_y - cam.dir_x * cam.plane_y;
    if det == Fixed::ZERO {
        return None;
    }
    let inv_det = det.recip_precise();

    let trans_x = inv_det * (cam.dir_y * sx - cam.dir_x * sy);
    let trans_y = inv_det * (cam.plane_x * sy - cam.plane_y * sx);
    if trans_y <= NEAR_PLANE {
        return None;
    }

    let screen_x = (Fixed::ONE + trans_x / trans_y)
        .mul_int(HALF_SCREEN_WIDTH)
        .to_int();

    // size of the sprite if it were a full-height wall slice
    let base_h = (((SCREEN_HEIGHT as i64) << Fixed::SHIFT) / trans_y.raw() as i64) as i32;
    let img = &sprite.image;
    let base_w = (base_h as i64 * img.width() as i64 / img.height() as i64) as i32;

    let scale = sprite.scale as i32;
    let height = base_h * scale / FULL_SCALE as i32;
    let width = base_w * scale / FULL_SCALE as i32;
    if height <= 0 || width <= 0 {
        return None;
    }

    // shrunken sprites keep their feet on the floor
    let pushdown = (base_h - height) >> 1;

    Some(VisSprite {
        depth: trans_y,
        screen_x,
        left: screen_x - (width >> 1),
        top: HALF_SCREEN_HEIGHT - (height >> 1) + pushdown,
        width,
        height,
    })
}

impl Software {
    /// Depth-tested billboards for one band, far to near.
    ///
    /// Returns how many sprites put at least one column on screen.
    pub fn draw_sprites(&mut self, band: &mut Band, cam: &Camera, sprites: &SpriteTable) -> usize {
        let mut order: SmallVec<[(Fixed, &Sprite); MAX_SPRITES]> = sprites
            .iter()
            .map(|(_, s)| {
                let dx = s.x - cam.pos_x;
                let dy = s.y - cam.pos_y;
                (dx * dx + dy * dy, s)
            })
            .collect();
        // painter's order; ties keep slot order
        order.sort_by(|a, b| b.0.cmp(&a.0));

        let mut drawn = 0;
        for (_, sprite) in order {
            if let Some(vis) = project(cam, sprite) {
                if self.draw_vis_sprite(band, sprite, &vis) {
                    drawn += 1;
                }
            }
        }
        drawn
    }

    fn draw_vis_sprite(&self, band: &mut Band, sprite: &Sprite, vis: &VisSprite) -> bool {
        let x_lo = vis.left.max(band.x_start() as i32);
        let x_hi = (vis.left + vis.width).min(band.x_end() as i32);
        if x_lo >= x_hi {
            return false;
        }

        let img = &sprite.image;

        // ------------------------------------------------ column pass ----
        let mut visible: SmallVec<[VisibleColumn; BAND_WIDTH]> = SmallVec::new();
        for x in x_lo..x_hi {
            if vis.depth >= self.depth.get(x as usize) {
                continue; // wall in front
            }
            let tex_x = ((x - vis.left) as i64 * img.width() as i64 / vis.width as i64) as usize;
            if tex_x < img.width() {
                visible.push(VisibleColumn { x, tex_x });
            }
        }
        if visible.is_empty() {
            return false;
        }

        // --------------------------------------------------- row pass ----
        let y_lo = vis.top.max(0);
        let y_hi = (vis.top + vis.height).min(SCREEN_HEIGHT as i32);
        for y in y_lo..y_hi {
            let tex_y = ((y - vis.top) as i64 * img.height() as i64 / vis.height as i64) as usize;
            if tex_y >= img.height() {
                continue;
            }
            let row = img.row(tex_y);
            for col in &visible {
                let px = row[col.tex_x];
                if px != sprite.transparent {
                    band.put(col.x, y, px);
                }
            }
        }
        true
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
