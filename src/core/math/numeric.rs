use nalgebra::Scalar;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Exact backend: arbitrary-precision rationals.
pub type Exact = BigRational;

/// Scalar field shared by the geometry kernel and the render pipeline.
///
/// Two backends implement it:
/// - `f64`: fast, comparisons are made against a caller-supplied tolerance.
/// - [`Exact`] (`BigRational`): every add/mul/div/compare is exact and the
///   default tolerance is zero. Only [`Real::sqrt`] is approximated (through
///   `f64`), so square roots must stay out of comparisons that decide hits.
///
/// Values are not required to be `Copy`; generic code clones explicitly.
/// Division by zero panics for rationals, so callers check denominators first.
pub trait Real:
    Scalar
    + PartialOrd
    + Zero
    + One
    + Neg<Output = Self>
    + Add<Output = Self>
    + AddAssign
    + Sub<Output = Self>
    + SubAssign
    + Mul<Output = Self>
    + MulAssign
    + Div<Output = Self>
    + DivAssign
    + Send
    + Sync
{
    /// Converts from `f64`. Rationals take the exact value of the binary float.
    fn from_f64(value: f64) -> Self;

    fn to_f64(&self) -> f64;

    /// Square root; exact for floats up to rounding, approximate for rationals.
    fn sqrt(&self) -> Self;

    fn abs(&self) -> Self;

    /// Largest integer not greater than `self`, saturating at the `i64` range.
    fn floor_to_i64(&self) -> i64;

    /// Tolerance used when the caller does not supply one.
    fn default_tolerance() -> Self;

    fn from_usize(value: usize) -> Self {
        Self::from_f64(value as f64)
    }

    fn half() -> Self {
        Self::one() / (Self::one() + Self::one())
    }
}

impl Real for f64 {
    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }

    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    fn floor_to_i64(&self) -> i64 {
        // `as` saturates and maps NaN to 0
        f64::floor(*self) as i64
    }

    fn default_tolerance() -> Self {
        1e-9
    }
}

impl Real for BigRational {
    fn from_f64(value: f64) -> Self {
        BigRational::from_float(value).unwrap_or_else(BigRational::zero)
    }

    fn to_f64(&self) -> f64 {
        ToPrimitive::to_f64(self).unwrap_or(f64::NAN)
    }

    fn sqrt(&self) -> Self {
        if !self.is_positive() {
            return BigRational::zero();
        }
        <Self as Real>::from_f64(f64::sqrt(Real::to_f64(self)))
    }

    fn abs(&self) -> Self {
        Signed::abs(self)
    }

    fn floor_to_i64(&self) -> i64 {
        let floor = self.floor().to_integer();
        floor.to_i64().unwrap_or(if floor.is_negative() {
            i64::MIN
        } else {
            i64::MAX
        })
    }

    fn default_tolerance() -> Self {
        BigRational::zero()
    }

    fn from_usize(value: usize) -> Self {
        BigRational::from_integer(BigInt::from(value))
    }
}

/// Returns the smaller of two partially ordered values (the first on ties).
#[inline]
pub fn min_of<T: Real>(a: T, b: T) -> T {
    if b < a { b } else { a }
}

/// Returns the larger of two partially ordered values (the first on ties).
#[inline]
pub fn max_of<T: Real>(a: T, b: T) -> T {
    if b > a { b } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rational_conversion_is_exact_for_binary_fractions() {
        let half = <Exact as Real>::from_f64(0.5);
        assert_eq!(half, Exact::new(BigInt::from(1), BigInt::from(2)));
        assert_eq!(Real::to_f64(&half), 0.5);
        assert_eq!(<Exact as Real>::half(), half);
    }

    #[test]
    fn floor_handles_negative_values() {
        let v = <Exact as Real>::from_f64(-2.25);
        assert_eq!(v.floor_to_i64(), -3);
        assert_eq!((-2.25f64).floor_to_i64(), -3);
        assert_eq!(<Exact as Real>::from_usize(7).floor_to_i64(), 7);
    }

    #[test]
    fn rational_sqrt_approximates() {
        let four = <Exact as Real>::from_usize(4);
        assert!((Real::to_f64(&Real::sqrt(&four)) - 2.0).abs() < 1e-12);
        assert!(Real::sqrt(&-four).is_zero());
    }

    #[test]
    fn tolerances() {
        assert!(<Exact as Real>::default_tolerance().is_zero());
        assert!(<f64 as Real>::default_tolerance() > 0.0);
    }

    #[test]
    fn min_max_keep_first_on_ties() {
        assert_eq!(min_of(1.0, 2.0), 1.0);
        assert_eq!(max_of(1.0, 2.0), 2.0);
        assert_eq!(min_of(3.0, 3.0), 3.0);
    }
}
