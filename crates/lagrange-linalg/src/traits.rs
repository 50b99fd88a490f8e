//! Algebraic structure traits for matrix entries.

use std::fmt::Debug;
use std::ops::{Add, Mul, Neg, Sub};

use lagrange_core::Rational;

/// A commutative ring with exact equality.
///
/// # Laws
///
/// - Addition is associative and commutative with identity `zero()`
/// - Multiplication is associative and commutative with identity `one()`
/// - Multiplication distributes over addition
/// - `is_zero` is exact: it never reports a non-zero element as zero
pub trait Ring:
    Clone + Eq + Debug + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Neg<Output = Self>
{
    /// The additive identity.
    fn zero() -> Self;

    /// The multiplicative identity.
    fn one() -> Self;

    /// Returns true if this is the additive identity.
    fn is_zero(&self) -> bool;

    /// Returns true if this is the multiplicative identity.
    fn is_one(&self) -> bool;

}

/// A ring where every non-zero element has a multiplicative inverse.
pub trait Field: Ring {
    /// Computes the multiplicative inverse.
    ///
    /// Returns `None` if the element is zero.
    fn inv(&self) -> Option<Self>;
}

impl Ring for Rational {
    fn zero() -> Self {
        <Self as num_traits::Zero>::zero()
    }

    fn one() -> Self {
        <Self as num_traits::One>::one()
    }

    fn is_zero(&self) -> bool {
        num_traits::Zero::is_zero(self)
    }

    fn is_one(&self) -> bool {
        num_traits::One::is_one(self)
    }
}

impl Field for Rational {
    fn inv(&self) -> Option<Self> {
        self.checked_recip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rational_field() {
        let a = Rational::from_i64(3, 4);
        assert_eq!(a.inv(), Some(Rational::from_i64(4, 3)));
        assert_eq!(a.clone() * a.inv().unwrap(), <Rational as Ring>::one());
        assert!(<Rational as Ring>::zero().inv().is_none());
    }
}
