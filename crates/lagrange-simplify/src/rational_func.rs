//! Rational functions over atoms.
//!
//! A [`Frac`] is a quotient of two [`Poly`]s kept in a normal form:
//!
//! # Invariants
//!
//! - Both polynomials are reduced modulo `sin^2 + cos^2 = 1`
//! - The denominator is non-zero, has integer coefficients with gcd 1 and a
//!   positive leading coefficient
//! - Numerator and denominator are coprime as polynomials over the atoms
//! - Zero is `0 / 1`
//!
//! Equal rational functions of the free polynomial ring therefore have one
//! representation. Fractions that agree only through the Pythagorean
//! identity, such as `(1 - cos x) / sin x` and `sin x / (1 + cos x)`, may
//! still differ, but zero is always detected.

use lagrange_core::Rational;
use num_traits::{One, Zero};

use crate::poly::{Poly, MAX_EXPONENT};
use crate::trig::reduce_pythagorean;

/// A normalized quotient of polynomials.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Frac {
    num: Poly,
    den: Poly,
}

impl Default for Frac {
    fn default() -> Self {
        Self::zero()
    }
}

impl Frac {
    /// `0 / 1`.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            num: Poly::zero(),
            den: Poly::one(),
        }
    }

    /// `1 / 1`.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(Rational::one())
    }

    /// A constant over 1.
    #[must_use]
    pub fn constant(c: Rational) -> Self {
        Self {
            num: Poly::constant(c),
            den: Poly::one(),
        }
    }

    /// A polynomial over 1.
    #[must_use]
    pub fn from_poly(p: Poly) -> Self {
        Self::normalized(p, Poly::one())
    }

    /// `num / den`, or `None` if `den` is zero modulo the Pythagorean
    /// identity.
    #[must_use]
    pub fn new(num: Poly, den: Poly) -> Option<Self> {
        let den = reduce_pythagorean(&den);
        if den.is_zero() {
            return None;
        }
        Some(Self::normalized(num, den))
    }

    /// The numerator.
    #[must_use]
    pub fn numerator(&self) -> &Poly {
        &self.num
    }

    /// The denominator, `1` for polynomials.
    #[must_use]
    pub fn denominator(&self) -> &Poly {
        &self.den
    }

    /// Returns true for zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.num.is_zero()
    }

    /// Returns true for one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.den.is_one() && self.num.is_one()
    }

    /// The value if the function is a constant.
    #[must_use]
    pub fn as_constant(&self) -> Option<Rational> {
        if self.den.is_one() {
            self.num.as_constant()
        } else {
            None
        }
    }

    /// Largest exponent in numerator or denominator.
    #[must_use]
    pub fn max_exponent(&self) -> u32 {
        self.num.max_exponent().max(self.den.max_exponent())
    }

    /// Sum over the least common denominator.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        if self.den == other.den {
            return Self::normalized(self.num.add(&other.num), self.den.clone());
        }
        // a/(g p) + b/(g q) = (a q + b p) / (g p q)
        let (p, q) = cancel(&self.den, &other.den);
        Self::normalized(
            self.num.mul(&q).add(&other.num.mul(&p)),
            self.den.mul(&q),
        )
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            num: self.num.neg(),
            den: self.den.clone(),
        }
    }

    /// Difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Product. Factors shared across the two fractions are cancelled
    /// before multiplying.
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let (n1, d2) = cancel(&self.num, &other.den);
        let (n2, d1) = cancel(&other.num, &self.den);
        Self::normalized(n1.mul(&n2), d1.mul(&d2))
    }

    /// Product, or `None` if an exponent could exceed [`MAX_EXPONENT`].
    #[must_use]
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        let bound = u64::from(self.max_exponent()) + u64::from(other.max_exponent());
        (bound <= u64::from(MAX_EXPONENT)).then(|| self.mul(other))
    }

    /// Multiplicative inverse, `None` for zero.
    #[must_use]
    pub fn inv(&self) -> Option<Self> {
        if self.is_zero() {
            return None;
        }
        Some(Self::normalized(self.den.clone(), self.num.clone()))
    }

    /// `self / other`, `None` if `other` is zero.
    #[must_use]
    pub fn div(&self, other: &Self) -> Option<Self> {
        Some(self.mul(&other.inv()?))
    }

    /// `self ^ k`, expanding numerator and denominator.
    #[must_use]
    pub fn pow(&self, k: u32) -> Self {
        Self::normalized(self.num.pow(k), self.den.pow(k))
    }

    /// `self ^ k`, or `None` if an exponent would exceed [`MAX_EXPONENT`].
    #[must_use]
    pub fn checked_pow(&self, k: u32) -> Option<Self> {
        Some(Self::normalized(
            self.num.checked_pow(k)?,
            self.den.checked_pow(k)?,
        ))
    }

    /// Puts `num / den` into normal form. `den` must be non-zero modulo
    /// the Pythagorean identity.
    pub(crate) fn normalized(num: Poly, den: Poly) -> Self {
        let num = reduce_pythagorean(&num);
        let den = reduce_pythagorean(&den);
        debug_assert!(!den.is_zero(), "zero denominator");
        if num.is_zero() {
            return Self::zero();
        }
        if den.as_constant().is_some() {
            return Self::over_constant(&num, &den);
        }

        // Exact quotients of reduced polynomials stay reduced.
        let (num, den) = cancel(&num, &den);
        if den.as_constant().is_some() {
            return Self::over_constant(&num, &den);
        }
        let inv = den
            .numeric_content()
            .checked_recip()
            .unwrap_or_else(Rational::one);
        Self {
            num: num.scale(&inv),
            den: den.scale(&inv),
        }
    }

    fn over_constant(num: &Poly, den: &Poly) -> Self {
        let inv = den
            .as_constant()
            .and_then(|c| c.checked_recip())
            .unwrap_or_else(Rational::one);
        Self {
            num: num.scale(&inv),
            den: Poly::one(),
        }
    }
}

/// Divides both polynomials by their gcd.
fn cancel(a: &Poly, b: &Poly) -> (Poly, Poly) {
    let g = a.gcd(b);
    if g.is_one() || g.is_zero() {
        return (a.clone(), b.clone());
    }
    match (a.div_exact(&g), b.div_exact(&g)) {
        (Some(p), Some(q)) => (p, q),
        _ => (a.clone(), b.clone()),
    }
}

impl From<Poly> for Frac {
    fn from(p: Poly) -> Self {
        Self::from_poly(p)
    }
}

impl From<Rational> for Frac {
    fn from(c: Rational) -> Self {
        if c.is_zero() {
            Self::zero()
        } else {
            Self::constant(c)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagrange_core::{Expr, SymbolRegistry};

    fn polys() -> (SymbolRegistry, Poly, Poly) {
        let mut reg = SymbolRegistry::new();
        let x = Expr::symbol(reg.declare_parameter("x").unwrap().symbol());
        let y = Expr::symbol(reg.declare_parameter("y").unwrap().symbol());
        (reg, Poly::atom(x), Poly::atom(y))
    }

    fn q(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn test_normalization() {
        let (_reg, x, y) = polys();
        // (2x^2 y) / (4 x y + 6 x) = (x y) / (2 y + 3)
        let num = x.pow(2).mul(&y).scale(&q(2));
        let den = x.mul(&y).scale(&q(4)).add(&x.scale(&q(6)));
        let f = Frac::new(num, den).unwrap();
        assert_eq!(f.numerator(), &x.mul(&y));
        assert_eq!(f.denominator(), &y.scale(&q(2)).add(&Poly::constant(q(3))));
    }

    #[test]
    fn test_exact_quotient() {
        let (_reg, x, y) = polys();
        // (x^2 - y^2) / (x + y) = x - y
        let f = Frac::new(x.pow(2).sub(&y.pow(2)), x.add(&y)).unwrap();
        assert_eq!(f.as_constant(), None);
        assert!(f.denominator().is_one());
        assert_eq!(f.numerator(), &x.sub(&y));
    }

    #[test]
    fn test_quotient_behind_monomial() {
        let (_reg, x, y) = polys();
        // (x^2 - y^2) / (y x + y^2) = (x - y) / y
        let f = Frac::new(x.pow(2).sub(&y.pow(2)), y.mul(&x.add(&y))).unwrap();
        assert_eq!(f.numerator(), &x.sub(&y));
        assert_eq!(f.denominator(), &y);
        // x / (x^2 + x y) = 1 / (x + y)
        let g = Frac::new(x.clone(), x.pow(2).add(&x.mul(&y))).unwrap();
        assert_eq!(g.numerator(), &Poly::one());
        assert_eq!(g.denominator(), &x.add(&y));
    }

    #[test]
    fn test_shared_sum_factor_cancels() {
        let (_reg, x, y) = polys();
        let one = Poly::one();
        // ((x + y)(x - 1)) / ((x + y)(x + 1)) = (x - 1) / (x + 1)
        let f = Frac::new(x.add(&y).mul(&x.sub(&one)), x.add(&y).mul(&x.add(&one))).unwrap();
        assert_eq!(f.numerator(), &x.sub(&one));
        assert_eq!(f.denominator(), &x.add(&one));
        // (x^2 - 1) / (x^2 + 2x + 1) = (x - 1) / (x + 1)
        let g = Frac::new(x.pow(2).sub(&one), x.add(&one).pow(2)).unwrap();
        assert_eq!(g, f);
    }

    #[test]
    fn test_sums_over_common_denominator() {
        let (_reg, x, y) = polys();
        let one = Poly::one();
        // 1/((x + 1) y) + 1/((x + 1) x) = (x + y) / ((x + 1) x y)
        let a = Frac::new(one.clone(), x.add(&one).mul(&y)).unwrap();
        let b = Frac::new(one.clone(), x.add(&one).mul(&x)).unwrap();
        let sum = a.add(&b);
        assert_eq!(sum.numerator(), &x.add(&y));
        assert_eq!(sum.denominator(), &x.add(&one).mul(&x).mul(&y));
        // (x/(x + y)) * ((x + y)/x) = 1
        let c = Frac::new(x.clone(), x.add(&y)).unwrap();
        assert!(c.mul(&c.inv().unwrap()).is_one());
    }

    #[test]
    fn test_field_operations() {
        let (_reg, x, y) = polys();
        let a = Frac::new(Poly::one(), x.add(&y)).unwrap();
        let b = Frac::new(x.clone(), y.clone()).unwrap();
        // a * a^-1 = 1
        assert!(a.mul(&a.inv().unwrap()).is_one());
        // (a + b) - b = a
        assert_eq!(a.add(&b).sub(&b), a);
        // a / a = 1
        assert!(a.div(&a).unwrap().is_one());
        assert!(Frac::zero().inv().is_none());
    }

    #[test]
    fn test_zero_denominator_rejected() {
        let (_reg, x, _) = polys();
        assert!(Frac::new(x, Poly::zero()).is_none());
    }
}
