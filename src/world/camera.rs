use glam::{Vec2, vec2};

use crate::math::{Fixed, degrees_to_radians};

/// Width of the view plane relative to the direction vector (≈66° FoV).
pub const FOV_RATIO: Fixed = Fixed::from_raw(43_253);

/// Directions shorter than this (0.01) are rejected by `set_direction`.
const MIN_DIRECTION_LEN: Fixed = Fixed::from_raw(655);

/// Largest component `set_direction` squares without saturating (64.0).
const MAX_DIRECTION_COMPONENT: Fixed = Fixed::from_int(64);

/// Player view-point in map space.
///
/// * Map X grows to the right, map Y grows downward (row index).
/// * `dir` is kept unit length; `plane` is `dir` turned a quarter turn to
///   the right and scaled by [`FOV_RATIO`].  Screen column 0 looks along
///   `dir - plane`, the last column along `dir + plane`.
/// * Everything is Q16.16; floats only cross the public setters/getters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    pub pos_x: Fixed,
    pub pos_y: Fixed,
    pub dir_x: Fixed,
    pub dir_y: Fixed,
    pub plane_x: Fixed,
    pub plane_y: Fixed,
}

impl Default for Camera {
    /// Centre of a 24×24 map, looking toward column 0.
    fn default() -> Self {
        let mut cam = Self {
            pos_x: Fixed::from_int(12),
            pos_y: Fixed::from_int(12),
            dir_x: -Fixed::ONE,
            dir_y: Fixed::ZERO,
            plane_x: Fixed::ZERO,
            plane_y: Fixed::ZERO,
        };
        cam.rebuild_plane();
        cam
    }
}

impl Camera {
    /// Create a camera at `pos` looking along `dir` (normalised here).
    pub fn new(pos: Vec2, dir: Vec2) -> Self {
        let mut cam = Self::default();
        cam.set_position(pos.x, pos.y);
        cam.set_direction(dir.x, dir.y);
        cam
    }

    /*──────────────────────── float boundary ────────────────────────*/

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.pos_x = Fixed::from_f32(x);
        self.pos_y = Fixed::from_f32(y);
    }

    /// Point the camera along `(dx, dy)`.
    ///
    /// The vector is normalised in fixed point.  A vector shorter than 0.01
    /// keeps the previous heading; the plane is rebuilt either way.
    pub fn set_direction(&mut self, dx: f32, dy: f32) {
        let mut fx = Fixed::from_f32(dx);
        let mut fy = Fixed::from_f32(dy);

        // halve both until |v|² fits; the heading is unchanged
        while fx.abs().max(fy.abs()) > MAX_DIRECTION_COMPONENT {
            fx = Fixed::from_raw(fx.raw() >> 1);
            fy = Fixed::from_raw(fy.raw() >> 1);
        }

        let len = (fx * fx + fy * fy).sqrt();
        if len > MIN_DIRECTION_LEN {
            self.dir_x = fx / len;
            self.dir_y = fy / len;
        }
        self.rebuild_plane();
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        vec2(self.pos_x.to_f32(), self.pos_y.to_f32())
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        vec2(self.dir_x.to_f32(), self.dir_y.to_f32())
    }

    #[inline]
    pub fn plane(&self) -> Vec2 {
        vec2(self.plane_x.to_f32(), self.plane_y.to_f32())
    }

    /*──────────────────────── movement helpers ──────────────────────*/

    /// Displace by `forward` along the heading and `strafe` along the plane
    /// (positive = right).
    ///
    /// No collision detection happens here; validating the destination
    /// against the map is the caller's policy.
    pub fn move_by(&mut self, forward: f32, strafe: f32) {
        let fwd = Fixed::from_f32(forward);
        let side = Fixed::from_f32(strafe);

        self.pos_x += self.dir_x * fwd + self.plane_x * side;
        self.pos_y += self.dir_y * fwd + self.plane_y * side;
    }

    /// Where `move_by(forward, strafe)` would land, without moving.
    pub fn peek_move(&self, forward: f32, strafe: f32) -> Vec2 {
        let mut probe = *self;
        probe.move_by(forward, strafe);
        probe.position()
    }

    /// Turn by `degrees` (positive = clockwise on the map, i.e. to the right).
    ///
    /// The rotated heading is re-normalised every call; table sine/cosine
    /// plus truncating multiplies otherwise shrink or grow `|dir|` a little
    /// on each turn, which shows up as walls sliding toward or away from a
    /// stationary player.
    pub fn rotate(&mut self, degrees: f32) {
        let rad = degrees_to_radians(degrees);
        let (s, c) = (rad.sin(), rad.cos());

        let old_x = self.dir_x;
        self.dir_x = self.dir_x * c - self.dir_y * s;
        self.dir_y = old_x * s + self.dir_y * c;

        let len_sq = self.dir_len_sq();
        if len_sq > Fixed::ZERO && len_sq != Fixed::ONE {
            let len = len_sq.sqrt();
            if len > Fixed::ZERO {
                self.dir_x = self.dir_x / len;
                self.dir_y = self.dir_y / len;
            }
        }

        self.rebuild_plane();
    }

    /*──────────────────────── derived values ────────────────────────*/

    /// `|dir|²`, 1.0 when the camera is healthy.
    #[inline]
    pub fn dir_len_sq(&self) -> Fixed {
        self.dir_x * self.dir_x + self.dir_y * self.dir_y
    }

    /// Map cell the eye stands in.
    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        (self.pos_x.to_int(), self.pos_y.to_int())
    }

    /// Quarter turn right of the heading, scaled by the FoV ratio.
    fn rebuild_plane(&mut self) {
        self.plane_x = -(self.dir_y * FOV_RATIO);
        self.plane_y = self.dir_x * FOV_RATIO;
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn near(a: Fixed, b: f64, tol: f64) -> bool {
        (a.to_f64() - b).abs() <= tol
    }

    #[test]
    fn default_faces_column_zero() {
        let cam = Camera::default();
        assert_eq!(cam.direction(), vec2(-1.0, 0.0));
        assert!(near(cam.plane_y, -0.66, 1e-3));
        assert_eq!(cam.plane_x, Fixed::ZERO);
    }

    #[test]
    fn plane_is_perpendicular_and_scaled() {
        let mut cam = Camera::default();
        cam.set_direction(3.0, 4.0);
        let d = cam.direction();
        let p = cam.plane();
        assert!((d.length() - 1.0).abs() < 1e-3);
        assert!(d.dot(p).abs() < 1e-3);
        assert!((p.length() - 0.66).abs() < 1e-3);
    }

    #[test]
    fn long_direction_vectors_are_normalised() {
        let mut cam = Camera::default();
        for (dx, dy) in [(1000.0, 0.0), (200.0, 0.0), (-3000.0, 4000.0), (0.0, -32000.0)] {
            cam.set_direction(dx, dy);
            let d = cam.direction();
            assert!((d.length() - 1.0).abs() < 1e-3, "({dx}, {dy}) -> {d:?}");
            assert!((d - vec2(dx, dy).normalize()).length() < 1e-3);
        }
    }

    #[test]
    fn degenerate_direction_keeps_heading() {
        let mut cam = Camera::default();
        cam.set_direction(0.0, 1.0);
        cam.set_direction(0.001, -0.002);
        assert_eq!(cam.direction(), vec2(0.0, 1.0));
    }

    #[test]
    fn move_and_strafe() {
        let mut cam = Camera::new(vec2(5.0, 5.0), vec2(0.0, -1.0));
        cam.move_by(1.0, 0.0);
        assert!((cam.position() - vec2(5.0, 4.0)).length() < 1e-3);
        // plane points right of the heading, i.e. +X when facing -Y
        cam.move_by(0.0, 1.0);
        assert!((cam.position() - vec2(5.66, 4.0)).length() < 1e-3);
        assert_eq!(cam.peek_move(1.0, 0.0), cam.peek_move(1.0, 0.0));
    }

    #[test]
    fn rotation_turns_right() {
        let mut cam = Camera::new(vec2(5.0, 5.0), vec2(0.0, -1.0));
        cam.rotate(90.0);
        assert!((cam.direction() - vec2(1.0, 0.0)).length() < 0.01);
        cam.rotate(-180.0);
        assert!((cam.direction() - vec2(-1.0, 0.0)).length() < 0.01);
    }

    #[test]
    fn thousand_small_rotations_do_not_drift() {
        let tol = Fixed::from_f64(0.005).raw();
        let mut cam = Camera::default();
        for step in 0..1_000 {
            cam.rotate(1.0);
            let drift = (cam.dir_len_sq().raw() - Fixed::ONE.raw()).abs();
            assert!(drift <= tol, "step {step}: |dir|^2 = {:?}", cam.dir_len_sq());
        }
        for _ in 0..1_000 {
            cam.rotate(-7.0);
        }
        assert!((cam.dir_len_sq().raw() - Fixed::ONE.raw()).abs() <= tol);
        assert!(cam.direction().dot(cam.plane()).abs() < 0.01);
    }
}
