//! Q16.16 fixed-point scalar.
//!
//! All geometry inside the engine (positions, ray directions, distances,
//! texture coordinates) lives in this format.  Floats only appear at the
//! public configuration boundary ([`Fixed::from_f32`] and friends).
//!
//! Arithmetic saturates instead of wrapping: a result that does not fit in
//! 32 bits clamps to [`Fixed::MAX`] / [`Fixed::MIN`].

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use super::tables::{RECIP_MAX, RECIP_MIN, RECIP_TABLE, RECIP_TABLE_SIZE, SIN_TABLE, SIN_TABLE_SIZE};

/// 32-bit signed value with 16 fractional bits.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Fixed(i32);

impl Fixed {
    pub const SHIFT: u32 = 16;
    pub const FRAC_MASK: i32 = (1 << Self::SHIFT) - 1;

    pub const ZERO: Fixed = Fixed(0);
    pub const ONE: Fixed = Fixed(1 << Self::SHIFT);
    pub const HALF: Fixed = Fixed(1 << (Self::SHIFT - 1));

    /// Largest representable value; doubles as the "infinitely far" sentinel.
    pub const MAX: Fixed = Fixed(i32::MAX);
    /// Symmetric with [`Fixed::MAX`] so that negating never overflows.
    pub const MIN: Fixed = Fixed(-i32::MAX);

    pub const PI: Fixed = Fixed(205_887);
    pub const TWO_PI: Fixed = Fixed(411_775);
    pub const HALF_PI: Fixed = Fixed(102_944);
    pub const DEG_TO_RAD: Fixed = Fixed(1_144);

    /// Magnitudes below this (≈0.004) have no representable reciprocal.
    pub const RECIP_GUARD: i32 = 256;

    /*──────────────────────── construction ───────────────────────────*/

    #[inline(always)]
    pub const fn from_raw(raw: i32) -> Self {
        Fixed(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self.0
    }

    #[inline(always)]
    pub const fn from_int(v: i32) -> Self {
        Fixed(v << Self::SHIFT)
    }

    /// Integer part, rounded toward negative infinity.
    #[inline(always)]
    pub const fn to_int(self) -> i32 {
        self.0 >> Self::SHIFT
    }

    /// Nearest representable value; out-of-range inputs clamp, NaN maps to zero.
    pub fn from_f64(v: f64) -> Self {
        let scaled = (v * (1u32 << Self::SHIFT) as f64).round();
        Fixed(scaled.clamp(Self::MIN.0 as f64, Self::MAX.0 as f64) as i32)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / (1u32 << Self::SHIFT) as f64
    }

    pub fn from_f32(v: f32) -> Self {
        Self::from_f64(v as f64)
    }

    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    /*──────────────────────── primitive ops ──────────────────────────*/

    /// `(a * b) >> 16` through a 64-bit intermediate.
    #[inline(always)]
    pub fn mul(self, rhs: Fixed) -> Fixed {
        saturate((self.0 as i64 * rhs.0 as i64) >> Self::SHIFT)
    }

    /// `(a << 16) / b` through a 64-bit intermediate.  Division by zero
    /// yields the signed sentinel instead of faulting.
    #[inline(always)]
    pub fn div(self, rhs: Fixed) -> Fixed {
        if rhs.0 == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        saturate(((self.0 as i64) << Self::SHIFT) / rhs.0 as i64)
    }

    /// Multiply by a plain integer.
    #[inline(always)]
    pub fn mul_int(self, rhs: i32) -> Fixed {
        saturate(self.0 as i64 * rhs as i64)
    }

    /// Divide by a plain integer (zero divisor yields the sentinel).
    #[inline(always)]
    pub fn div_int(self, rhs: i32) -> Fixed {
        if rhs == 0 {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        Fixed(self.0 / rhs)
    }

    #[inline(always)]
    pub fn abs(self) -> Fixed {
        // MIN is -i32::MAX, so this never overflows for engine values
        Fixed(self.0.saturating_abs())
    }

    #[inline(always)]
    pub fn floor(self) -> Fixed {
        Fixed(self.0 & !Self::FRAC_MASK)
    }

    #[inline(always)]
    pub fn ceil(self) -> Fixed {
        Fixed(self.0.saturating_add(Self::FRAC_MASK) & !Self::FRAC_MASK)
    }

    /// Fractional bits only, always in `[0, 1)`.
    #[inline(always)]
    pub fn frac(self) -> Fixed {
        Fixed(self.0 & Self::FRAC_MASK)
    }

    #[inline(always)]
    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    /*──────────────────────── trigonometry ───────────────────────────*/

    /// Table sine of an angle in radians.
    ///
    /// The angle is folded into `[0, 2π)`, split into a quadrant and a phase,
    /// and the phase is mapped linearly onto the 256 quarter-turn samples.
    /// Quadrants 1 and 3 read the table mirrored, 2 and 3 negate.
    pub fn sin(self) -> Fixed {
        let angle = self.0.rem_euclid(Self::TWO_PI.0);

        let quadrant = ((angle as i64 * 4) / Self::TWO_PI.0 as i64).min(3) as i32;
        let phase = angle - quadrant * Self::HALF_PI.0;

        let last = SIN_TABLE_SIZE as i32 - 1;
        let index = ((phase as i64 * last as i64) / Self::HALF_PI.0 as i64).clamp(0, last as i64)
            as usize;
        let mirrored = SIN_TABLE_SIZE - 1 - index;

        match quadrant {
            0 => Fixed(SIN_TABLE[index]),
            1 => Fixed(SIN_TABLE[mirrored]),
            2 => Fixed(-SIN_TABLE[index]),
            _ => Fixed(-SIN_TABLE[mirrored]),
        }
    }

    /// `cos(x) = sin(x + π/2)`.
    #[inline]
    pub fn cos(self) -> Fixed {
        Fixed(self.0.rem_euclid(Self::TWO_PI.0) + Self::HALF_PI.0).sin()
    }

    /*──────────────────────── reciprocal ─────────────────────────────*/

    /// Table reciprocal.
    ///
    /// * `|x|` in `[0.25, 4]`: direct lookup, linearly blended between the
    ///   two neighbouring samples.
    /// * `|x|` in `(4, 32]`: lookup of `x / 8`, result divided by 8.
    /// * anything else above the guard: plain division.
    /// * `|x|` below [`Fixed::RECIP_GUARD`]: signed [`Fixed::MAX`].
    pub fn recip(self) -> Fixed {
        let neg = self.0 < 0;
        let mag = self.0.saturating_abs();

        let out = if mag < Self::RECIP_GUARD {
            Self::MAX
        } else if (RECIP_MIN..=RECIP_MAX).contains(&mag) {
            Fixed(table_recip(mag))
        } else if mag > RECIP_MAX && mag <= RECIP_MAX * 8 {
            Fixed(table_recip(mag >> 3) >> 3)
        } else {
            Self::ONE.div(Fixed(mag))
        };

        if neg { -out } else { out }
    }

    /// Division-based reciprocal with the same guard as [`Fixed::recip`].
    /// Used on the raycasting hot path where accuracy matters more than the
    /// table's speed.
    pub fn recip_precise(self) -> Fixed {
        if self.0 > -Self::RECIP_GUARD && self.0 < Self::RECIP_GUARD {
            return if self.0 < 0 { Self::MIN } else { Self::MAX };
        }
        Self::ONE.div(self)
    }

    /*──────────────────────── square root ────────────────────────────*/

    /// Newton–Raphson square root, four fixed iterations.
    ///
    /// The seed is `2^(bits/2)` of the raw value, which is always within a
    /// factor of √2 of the answer, so four steps reach full Q16.16 precision.
    pub fn sqrt(self) -> Fixed {
        if self.0 <= 0 {
            return Self::ZERO;
        }
        let bits = 32 - self.0.leading_zeros();
        let mut guess = Fixed(1 << ((bits + Self::SHIFT) / 2));
        for _ in 0..4 {
            guess = Fixed((guess.0 + self.div(guess).0) >> 1);
        }
        guess
    }
}

/// Blend between the two reciprocal samples bracketing `mag`.
fn table_recip(mag: i32) -> i32 {
    let span = (RECIP_MAX - RECIP_MIN) as i64;
    let last = RECIP_TABLE_SIZE as i64 - 1;
    let pos = (mag - RECIP_MIN) as i64 * last;
    let index = (pos / span) as usize;
    if index >= RECIP_TABLE_SIZE - 1 {
        return RECIP_TABLE[RECIP_TABLE_SIZE - 1];
    }
    let rem = pos % span;
    let lo = RECIP_TABLE[index] as i64;
    let hi = RECIP_TABLE[index + 1] as i64;
    (lo + (hi - lo) * rem / span) as i32
}

#[inline(always)]
fn saturate(v: i64) -> Fixed {
    Fixed(v.clamp(Fixed::MIN.0 as i64, Fixed::MAX.0 as i64) as i32)
}

/*──────────────────────── operator sugar ─────────────────────────────*/

impl Add for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn add(self, rhs: Fixed) -> Fixed {
        saturate(self.0 as i64 + rhs.0 as i64)
    }
}

impl Sub for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn sub(self, rhs: Fixed) -> Fixed {
        saturate(self.0 as i64 - rhs.0 as i64)
    }
}

impl AddAssign for Fixed {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Fixed) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fixed {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Fixed) {
        *self = *self - rhs;
    }
}

impl Neg for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn neg(self) -> Fixed {
        Fixed(self.0.saturating_neg())
    }
}

impl Mul for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn mul(self, rhs: Fixed) -> Fixed {
        Fixed::mul(self, rhs)
    }
}

impl Div for Fixed {
    type Output = Fixed;
    #[inline(always)]
    fn div(self, rhs: Fixed) -> Fixed {
        Fixed::div(self, rhs)
    }
}

impl fmt::Debug for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fixed({:.5})", self.to_f64())
    }
}

impl fmt::Display for Fixed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}", self.to_f64())
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn fx(v: f64) -> Fixed {
        Fixed::from_f64(v)
    }

    #[test]
    fn mul_div_basics() {
        assert_eq!(fx(1.5) * fx(2.0), fx(3.0));
        assert_eq!(fx(-2.0) * fx(0.25), fx(-0.5));
        assert_eq!(fx(3.0) / fx(2.0), fx(1.5));
        assert_eq!(Fixed::from_int(7).to_int(), 7);
    }

    #[test]
    fn overflow_saturates() {
        assert_eq!(fx(30000.0) * fx(30000.0), Fixed::MAX);
        assert_eq!(fx(-30000.0) * fx(30000.0), Fixed::MIN);
        assert_eq!(Fixed::MAX + Fixed::ONE, Fixed::MAX);
        assert_eq!(fx(1.0) / Fixed::ZERO, Fixed::MAX);
        assert_eq!(fx(-1.0) / Fixed::ZERO, Fixed::MIN);
    }

    #[test]
    fn floor_ceil_frac() {
        assert_eq!(fx(2.75).floor(), fx(2.0));
        assert_eq!(fx(2.25).ceil(), fx(3.0));
        assert_eq!(fx(2.0).ceil(), fx(2.0));
        assert_eq!(fx(-1.25).floor(), fx(-2.0));
        assert_eq!(fx(5.5).frac(), fx(0.5));
        assert_eq!(fx(-0.25).frac(), fx(0.75));
        assert_eq!(fx(-3.5).abs(), fx(3.5));
    }

    #[test]
    fn float_round_trip_within_one_ulp() {
        let mut raw: i64 = Fixed::MIN.raw() as i64;
        while raw <= Fixed::MAX.raw() as i64 {
            let x = Fixed::from_raw(raw as i32);
            let back = Fixed::from_f64(x.to_f64());
            assert!((back.raw() as i64 - x.raw() as i64).abs() <= 1, "raw {raw}");
            raw += 9_999_991;
        }
        let x = fx(12.345);
        assert!((Fixed::from_f32(x.to_f32()).raw() - x.raw()).abs() <= 1);
    }

    #[test]
    fn pythagorean_identity_holds() {
        let tol = fx(0.01).raw();
        let mut a = -4 * Fixed::TWO_PI.raw();
        while a < 4 * Fixed::TWO_PI.raw() {
            let t = Fixed::from_raw(a);
            let (s, c) = (t.sin(), t.cos());
            let sum = s * s + c * c;
            assert!((sum.raw() - Fixed::ONE.raw()).abs() <= tol, "angle {t:?} -> {sum:?}");
            a += 997;
        }
    }

    #[test]
    fn sine_landmarks() {
        let tol = fx(0.01).raw();
        let near = |a: Fixed, b: f64| (a.raw() - fx(b).raw()).abs() <= tol;
        assert!(near(Fixed::ZERO.sin(), 0.0));
        assert!(near(Fixed::HALF_PI.sin(), 1.0));
        assert!(near(Fixed::PI.sin(), 0.0));
        assert!(near(fx(-std::f64::consts::FRAC_PI_2).sin(), -1.0));
        assert!(near(Fixed::ZERO.cos(), 1.0));
        assert!(near(Fixed::PI.cos(), -1.0));
        assert!(near(fx(std::f64::consts::FRAC_PI_6).sin(), 0.5));
    }

    #[test]
    fn reciprocal_inside_table_domain() {
        let tol = fx(0.01).raw();
        let mut raw = 16_384;
        while raw <= 262_144 {
            let x = Fixed::from_raw(raw);
            let p = x.recip() * x;
            assert!((p.raw() - Fixed::ONE.raw()).abs() <= tol, "x = {x:?}, x*1/x = {p:?}");
            raw += 311;
        }
    }

    #[test]
    fn reciprocal_scaled_and_division_paths() {
        let tol = fx(0.02).raw();
        for v in [5.0, 10.0, 31.0, 100.0, 0.1, 0.01] {
            for s in [1.0, -1.0] {
                let x = fx(v * s);
                let p = x.recip() * x;
                assert!((p.raw() - Fixed::ONE.raw()).abs() <= tol, "x = {x:?}");
            }
        }
    }

    #[test]
    fn reciprocal_guard_returns_sentinel() {
        assert_eq!(Fixed::ZERO.recip(), Fixed::MAX);
        assert_eq!(Fixed::from_raw(255).recip(), Fixed::MAX);
        assert_eq!(Fixed::from_raw(-3).recip(), Fixed::MIN);
        assert_eq!(Fixed::from_raw(100).recip_precise(), Fixed::MAX);
        assert_eq!(Fixed::from_raw(-100).recip_precise(), Fixed::MIN);
        assert_eq!(fx(2.0).recip_precise(), fx(0.5));
    }

    #[test]
    fn square_root() {
        let tol = 4;
        for v in [0.25, 1.0, 2.0, 4.0, 9.0, 100.0, 10_000.0, 0.01] {
            let got = fx(v).sqrt();
            let want = fx(v.sqrt());
            assert!((got.raw() - want.raw()).abs() <= tol, "sqrt({v}) = {got:?}");
        }
        assert_eq!(fx(-4.0).sqrt(), Fixed::ZERO);
        assert_eq!(Fixed::ZERO.sqrt(), Fixed::ZERO);
    }
}
