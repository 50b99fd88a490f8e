//! Exact rational coefficients.
//!
//! Every numeric constant in an expression is an arbitrary precision
//! rational, so differentiation, elimination and simplification never
//! round or overflow. Floating point only appears when an expression is
//! evaluated numerically.

use dashu::base::{Abs, BitTest, Gcd, Inverse, Signed as DashuSigned};
use dashu::integer::IBig;
use dashu::rational::RBig;
use num_traits::{One, Zero};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// An arbitrary precision integer, used for numerators, denominators and
/// content computations.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Integer(IBig);

impl Integer {
    /// Creates a new integer from an i64.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(IBig::from(value))
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns true if this integer is negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Computes the (non-negative) greatest common divisor.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        Self(IBig::from(self.0.clone().gcd(other.0.clone())))
    }

    /// Computes the (non-negative) least common multiple.
    #[must_use]
    pub fn lcm(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let g = self.gcd(other);
        Self(&self.0 / &g.0 * &other.0).abs()
    }

    /// Attempts to convert to an i64.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.clone().try_into().ok()
    }

    /// Returns the inner `dashu::IBig`.
    #[must_use]
    pub fn into_inner(self) -> IBig {
        self.0
    }
}

impl Zero for Integer {
    fn zero() -> Self {
        Self(IBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0 == IBig::ZERO
    }
}

impl One for Integer {
    fn one() -> Self {
        Self(IBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == IBig::ONE
    }
}

impl Add for Integer {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul for Integer {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl fmt::Debug for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Integer({})", self.0)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An exact rational number, always stored in lowest terms with a
/// positive denominator.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rational(RBig);

impl Rational {
    /// Creates a rational from a numerator and a denominator.
    ///
    /// Returns `None` if the denominator is zero.
    #[must_use]
    pub fn from_integers(numerator: Integer, denominator: Integer) -> Option<Self> {
        if denominator.is_zero() {
            return None;
        }
        Some(Self(RBig::from(numerator.into_inner()) / RBig::from(denominator.into_inner())))
    }

    /// Creates a rational from i64 numerator and denominator.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn from_i64(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "denominator cannot be zero");
        Self(RBig::from(numerator) / RBig::from(denominator))
    }

    /// Returns the numerator (carries the sign).
    #[must_use]
    pub fn numerator(&self) -> Integer {
        Integer(self.0.numerator().clone())
    }

    /// Returns the (positive) denominator.
    #[must_use]
    pub fn denominator(&self) -> Integer {
        Integer(IBig::from(self.0.denominator().clone()))
    }

    /// Returns true if this rational is an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.denominator().is_one()
    }

    /// Returns the value as an i64 if it is an integer that fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.is_integer() {
            self.numerator().to_i64()
        } else {
            None
        }
    }

    /// Returns true if negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        DashuSigned::is_negative(&self.0)
    }

    /// Returns the absolute value.
    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.clone().abs())
    }

    /// Returns the reciprocal, or `None` for zero.
    #[must_use]
    pub fn checked_recip(&self) -> Option<Self> {
        if self.is_zero() {
            None
        } else {
            Some(Self(self.0.clone().inv()))
        }
    }

    /// Size bound for [`powi`](Self::powi) results, in bits.
    pub const MAX_POWER_BITS: usize = 1 << 16;

    /// Computes `self^exp` for an integer exponent.
    ///
    /// Returns `None` for a negative power of zero, and when the numerator
    /// or denominator of the result would exceed [`Self::MAX_POWER_BITS`].
    #[must_use]
    pub fn powi(&self, exp: i64) -> Option<Self> {
        let magnitude = usize::try_from(exp.unsigned_abs()).ok()?;
        let bits = self
            .0
            .numerator()
            .bit_len()
            .max(self.0.denominator().bit_len())
            .saturating_sub(1);
        if bits.checked_mul(magnitude)? > Self::MAX_POWER_BITS {
            return None;
        }
        let raised = Self(self.0.pow(magnitude));
        if exp < 0 {
            raised.checked_recip()
        } else {
            Some(raised)
        }
    }

    /// Nearest `f64` approximation.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().value()
    }
}

impl Zero for Rational {
    fn zero() -> Self {
        Self(RBig::ZERO)
    }

    fn is_zero(&self) -> bool {
        self.0 == RBig::ZERO
    }
}

impl One for Rational {
    fn one() -> Self {
        Self(RBig::ONE)
    }

    fn is_one(&self) -> bool {
        self.0 == RBig::ONE
    }
}

impl fmt::Debug for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rational({self})")
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numerator())
        } else {
            write!(f, "{}/{}", self.numerator(), self.denominator())
        }
    }
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Add for &Rational {
    type Output = Rational;

    fn add(self, rhs: Self) -> Self::Output {
        Rational(&self.0 + &rhs.0)
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Sub for &Rational {
    type Output = Rational;

    fn sub(self, rhs: Self) -> Self::Output {
        Rational(&self.0 - &rhs.0)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self(self.0 * rhs.0)
    }
}

impl Mul for &Rational {
    type Output = Rational;

    fn mul(self, rhs: Self) -> Self::Output {
        Rational(&self.0 * &rhs.0)
    }
}

impl Div for Rational {
    type Output = Self;

    /// # Panics
    ///
    /// Panics on division by zero; callers check with `checked_recip`.
    fn div(self, rhs: Self) -> Self::Output {
        Self(self.0 / rhs.0)
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Neg for &Rational {
    type Output = Rational;

    fn neg(self) -> Self::Output {
        Rational(-&self.0)
    }
}

impl From<Integer> for Rational {
    fn from(n: Integer) -> Self {
        Self(RBig::from(n.into_inner()))
    }
}

impl From<i64> for Rational {
    fn from(n: i64) -> Self {
        Self(RBig::from(n))
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self(RBig::from(i64::from(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduction_and_display() {
        assert_eq!(Rational::from_i64(4, 6).to_string(), "2/3");
        assert_eq!(Rational::from_i64(6, -3).to_string(), "-2");
        assert_eq!(Rational::from_i64(1, 2).denominator(), Integer::new(2));
    }

    #[test]
    fn test_arithmetic() {
        let half = Rational::from_i64(1, 2);
        let third = Rational::from_i64(1, 3);
        assert_eq!(&half + &third, Rational::from_i64(5, 6));
        assert_eq!(&half * &third, Rational::from_i64(1, 6));
        assert_eq!(half.clone() / third.clone(), Rational::from_i64(3, 2));
        assert_eq!(-half, Rational::from_i64(-1, 2));
    }

    #[test]
    fn test_powi() {
        let two_thirds = Rational::from_i64(2, 3);
        assert_eq!(two_thirds.powi(2), Some(Rational::from_i64(4, 9)));
        assert_eq!(two_thirds.powi(-1), Some(Rational::from_i64(3, 2)));
        assert_eq!(Rational::zero().powi(-1), None);
        assert_eq!(Rational::zero().powi(0), Some(Rational::one()));
        assert_eq!(Rational::from_i64(-1, 1).powi(1_000_000_000_001), Some(Rational::from_i64(-1, 1)));
        assert_eq!(Rational::from_i64(2, 1).powi(1_000_000_000_000), None);
        assert_eq!(Rational::from_i64(1, 2).powi(-70_000), None);
        assert!(Rational::from_i64(2, 1).powi(60_000).is_some());
    }

    #[test]
    fn test_gcd_lcm() {
        assert_eq!(Integer::new(12).gcd(&Integer::new(-18)), Integer::new(6));
        assert_eq!(Integer::new(4).lcm(&Integer::new(6)), Integer::new(12));
    }

    #[test]
    fn test_to_f64() {
        assert!((Rational::from_i64(1, 4).to_f64() - 0.25).abs() < 1e-15);
        assert_eq!(Rational::from_i64(-7, 1).to_i64(), Some(-7));
        assert_eq!(Rational::from_i64(1, 2).to_i64(), None);
    }
}
