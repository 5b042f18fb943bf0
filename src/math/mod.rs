//! Numeric foundation: Q16.16 scalar plus its constant lookup tables.
//!
//! The target has no FPU, so every per-pixel and per-column quantity in
//! the renderer is a [`Fixed`].

mod fixed;
pub mod tables;

pub use fixed::Fixed;

/// Degrees → fixed-point radians at the configuration boundary.
#[inline]
pub fn degrees_to_radians(degrees: f32) -> Fixed {
    Fixed::from_f64(degrees as f64 * std::f64::consts::PI / 180.0)
}
