//! Symbolic rational functions as a field.
//!
//! Entries are kept in the canonical rational form of `lagrange-simplify`,
//! so equality is structural on normal forms and the zero test is exact.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use lagrange_core::Expr;
use lagrange_simplify::{Frac, Simplifier};

use crate::traits::{Field, Ring};

/// A rational function used as a matrix entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbolic(Frac);

impl Symbolic {
    /// Wraps a canonical rational function.
    #[must_use]
    pub fn new(frac: Frac) -> Self {
        Self(frac)
    }

    /// Canonical form of an expression.
    #[must_use]
    pub fn from_expr(simplifier: &Simplifier, expr: &Expr) -> Self {
        Self(simplifier.canonical(expr))
    }

    /// The canonical form.
    #[must_use]
    pub fn frac(&self) -> &Frac {
        &self.0
    }

    /// Unwraps the canonical form.
    #[must_use]
    pub fn into_frac(self) -> Frac {
        self.0
    }

    /// Renders the entry as a simplified expression.
    #[must_use]
    pub fn to_expr(&self, simplifier: &Simplifier) -> Expr {
        simplifier.render(&self.0)
    }
}

impl From<Frac> for Symbolic {
    fn from(frac: Frac) -> Self {
        Self(frac)
    }
}

impl fmt::Debug for Symbolic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbolic({})", Simplifier::new().render(&self.0))
    }
}

impl Add for Symbolic {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.add(&rhs.0))
    }
}

impl Sub for Symbolic {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0.sub(&rhs.0))
    }
}

impl Mul for Symbolic {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0.mul(&rhs.0))
    }
}

impl Neg for Symbolic {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.neg())
    }
}

impl Ring for Symbolic {
    fn zero() -> Self {
        Self(Frac::zero())
    }

    fn one() -> Self {
        Self(Frac::one())
    }

    fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    fn is_one(&self) -> bool {
        self.0.is_one()
    }
}

impl Field for Symbolic {
    fn inv(&self) -> Option<Self> {
        self.0.inv().map(Self)
    }
}
