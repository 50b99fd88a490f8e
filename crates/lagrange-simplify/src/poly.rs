//! Sparse multivariate polynomials over opaque atoms.
//!
//! An atom is any expression the canonical form does not look inside:
//! symbols, function applications, fractional powers and time-derivative
//! markers. Monomials are ordered lexicographically with smaller atoms more
//! significant, which is a monomial order, so leading terms behave under
//! multiplication and exact division works term by term.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use lagrange_core::{Expr, Integer, Rational};
use num_traits::{One, Zero};
use smallvec::SmallVec;

/// Largest exponent kept inside a canonical monomial. Higher powers stay
/// opaque atoms, so products of canonical forms remain far from `u32::MAX`.
pub const MAX_EXPONENT: u32 = 1 << 24;

/// A power product of atoms.
///
/// Invariant: sorted by atom, no duplicate atoms, no zero exponents.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Monomial(SmallVec<[(Expr, u32); 4]>);

impl Monomial {
    /// The empty product.
    #[must_use]
    pub fn one() -> Self {
        Self(SmallVec::new())
    }

    /// `atom ^ exp`.
    #[must_use]
    pub fn atom(atom: Expr, exp: u32) -> Self {
        if exp == 0 {
            return Self::one();
        }
        Self(smallvec::smallvec![(atom, exp)])
    }

    /// Returns true for the empty product.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(atom, exponent)` pairs in atom order.
    pub fn iter(&self) -> impl Iterator<Item = &(Expr, u32)> {
        self.0.iter()
    }

    /// Exponent of `atom`, zero if absent.
    #[must_use]
    pub fn degree_of(&self, atom: &Expr) -> u32 {
        self.0
            .binary_search_by(|(a, _)| a.cmp(atom))
            .map_or(0, |i| self.0[i].1)
    }

    /// Total degree.
    #[must_use]
    pub fn total_degree(&self) -> u32 {
        self.0.iter().fold(0, |acc, (_, e)| acc.saturating_add(*e))
    }

    /// Returns the monomial with the exponent of `atom` replaced.
    #[must_use]
    pub fn with_degree(&self, atom: &Expr, exp: u32) -> Self {
        let mut out = self.0.clone();
        match out.binary_search_by(|(a, _)| a.cmp(atom)) {
            Ok(i) if exp == 0 => {
                out.remove(i);
            }
            Ok(i) => out[i].1 = exp,
            Err(_) if exp == 0 => {}
            Err(i) => out.insert(i, (atom.clone(), exp)),
        }
        Self(out)
    }

    /// Multiplies two monomials (adds exponents). Exponents saturate at
    /// `u32::MAX`; see [`checked_mul`](Self::checked_mul).
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        self.merge(other, |a, b| Some(a.saturating_add(b)))
            .unwrap_or_default()
    }

    /// Multiplies two monomials, or `None` if an exponent would exceed
    /// [`MAX_EXPONENT`].
    #[must_use]
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        self.merge(other, |a, b| a.checked_add(b).filter(|e| *e <= MAX_EXPONENT))
    }

    /// Divides by `other` if every exponent allows it.
    #[must_use]
    pub fn div(&self, other: &Self) -> Option<Self> {
        let mut out = self.0.clone();
        for (atom, e) in &other.0 {
            let i = out.binary_search_by(|(a, _)| a.cmp(atom)).ok()?;
            match out[i].1.cmp(e) {
                Ordering::Less => return None,
                Ordering::Equal => {
                    out.remove(i);
                }
                Ordering::Greater => out[i].1 -= e,
            }
        }
        Some(Self(out))
    }

    /// Greatest common divisor (minimum exponents).
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        let out = self
            .0
            .iter()
            .filter_map(|(atom, e)| {
                let f = other.degree_of(atom);
                (f > 0).then(|| (atom.clone(), (*e).min(f)))
            })
            .collect();
        Self(out)
    }

    /// `self ^ k`, saturating like [`mul`](Self::mul).
    #[must_use]
    pub fn pow(&self, k: u32) -> Self {
        if k == 0 {
            return Self::one();
        }
        Self(
            self.0
                .iter()
                .map(|(a, e)| (a.clone(), e.saturating_mul(k)))
                .collect(),
        )
    }

    /// `self ^ k`, or `None` if an exponent would exceed [`MAX_EXPONENT`].
    #[must_use]
    pub fn checked_pow(&self, k: u32) -> Option<Self> {
        if k == 0 {
            return Some(Self::one());
        }
        self.0
            .iter()
            .map(|(a, e)| {
                e.checked_mul(k)
                    .filter(|e| *e <= MAX_EXPONENT)
                    .map(|e| (a.clone(), e))
            })
            .collect::<Option<_>>()
            .map(Self)
    }

    /// Largest exponent.
    #[must_use]
    pub fn max_exponent(&self) -> u32 {
        self.0.iter().map(|(_, e)| *e).max().unwrap_or(0)
    }

    /// The product of atoms as an expression.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::mul(
            self.0
                .iter()
                .map(|(a, e)| Expr::powi(a.clone(), i64::from(*e))),
        )
    }

    fn merge(&self, other: &Self, combine: impl Fn(u32, u32) -> Option<u32>) -> Option<Self> {
        let mut out = SmallVec::with_capacity(self.0.len() + other.0.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (a, ea) = &self.0[i];
            let (b, eb) = &other.0[j];
            match a.cmp(b) {
                Ordering::Less => {
                    out.push((a.clone(), *ea));
                    i += 1;
                }
                Ordering::Greater => {
                    out.push((b.clone(), *eb));
                    j += 1;
                }
                Ordering::Equal => {
                    out.push((a.clone(), combine(*ea, *eb)?));
                    i += 1;
                    j += 1;
                }
            }
        }
        out.extend(self.0[i..].iter().cloned());
        out.extend(other.0[j..].iter().cloned());
        Some(Self(out))
    }
}

impl PartialOrd for Monomial {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Monomial {
    /// Lexicographic order on exponent vectors, smallest atom first.
    fn cmp(&self, other: &Self) -> Ordering {
        let (mut i, mut j) = (0, 0);
        loop {
            match (self.0.get(i), other.0.get(j)) {
                (None, None) => return Ordering::Equal,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some((a, ea)), Some((b, eb))) => match a.cmp(b) {
                    // `a` is absent from `other`, so `self` has the larger
                    // exponent in the more significant position.
                    Ordering::Less => return Ordering::Greater,
                    Ordering::Greater => return Ordering::Less,
                    Ordering::Equal => {
                        if ea != eb {
                            return ea.cmp(eb);
                        }
                        i += 1;
                        j += 1;
                    }
                },
            }
        }
    }
}

/// A sparse polynomial with exact rational coefficients.
///
/// Invariant: no zero coefficients.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Poly {
    terms: BTreeMap<Monomial, Rational>,
}

impl Poly {
    /// The zero polynomial.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// The constant one.
    #[must_use]
    pub fn one() -> Self {
        Self::constant(Rational::one())
    }

    /// A constant polynomial.
    #[must_use]
    pub fn constant(c: Rational) -> Self {
        Self::term(c, Monomial::one())
    }

    /// `c * m`.
    #[must_use]
    pub fn term(c: Rational, m: Monomial) -> Self {
        let mut terms = BTreeMap::new();
        if !c.is_zero() {
            terms.insert(m, c);
        }
        Self { terms }
    }

    /// The polynomial consisting of one atom.
    #[must_use]
    pub fn atom(atom: Expr) -> Self {
        Self::term(Rational::one(), Monomial::atom(atom, 1))
    }

    /// Returns true for the zero polynomial.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Returns true for the constant one.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_constant().is_some_and(|c| c.is_one())
    }

    /// The value if the polynomial has no atoms.
    #[must_use]
    pub fn as_constant(&self) -> Option<Rational> {
        match self.terms.len() {
            0 => Some(Rational::zero()),
            1 => self
                .terms
                .iter()
                .next()
                .filter(|(m, _)| m.is_one())
                .map(|(_, c)| c.clone()),
            _ => None,
        }
    }

    /// Number of terms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Same as [`is_zero`](Self::is_zero).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Largest exponent of any atom in any term.
    #[must_use]
    pub fn max_exponent(&self) -> u32 {
        self.terms
            .keys()
            .map(Monomial::max_exponent)
            .max()
            .unwrap_or(0)
    }

    /// Terms in ascending monomial order.
    pub fn terms(&self) -> impl DoubleEndedIterator<Item = (&Monomial, &Rational)> {
        self.terms.iter()
    }

    /// The term with the largest monomial.
    #[must_use]
    pub fn leading(&self) -> Option<(&Monomial, &Rational)> {
        self.terms.iter().next_back()
    }

    /// Returns true if any atom satisfies `pred`.
    pub fn any_atom<F: Fn(&Expr) -> bool>(&self, pred: F) -> bool {
        self.terms
            .keys()
            .any(|m| m.iter().any(|(atom, _)| pred(atom)))
    }

    pub(crate) fn add_term(&mut self, m: Monomial, c: Rational) {
        if c.is_zero() {
            return;
        }
        match self.terms.get_mut(&m) {
            Some(existing) => {
                let sum = &*existing + &c;
                if sum.is_zero() {
                    self.terms.remove(&m);
                } else {
                    *existing = sum;
                }
            }
            None => {
                self.terms.insert(m, c);
            }
        }
    }

    /// Sum.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), c.clone());
        }
        out
    }

    /// Difference.
    #[must_use]
    pub fn sub(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (m, c) in &other.terms {
            out.add_term(m.clone(), -c);
        }
        out
    }

    /// Negation.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), -c)).collect(),
        }
    }

    /// Product. Exponents saturate like [`Monomial::mul`].
    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        let mut out = Self::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                out.add_term(m1.mul(m2), c1 * c2);
            }
        }
        out
    }

    /// Product, or `None` if an exponent would exceed [`MAX_EXPONENT`].
    #[must_use]
    pub fn checked_mul(&self, other: &Self) -> Option<Self> {
        let mut out = Self::zero();
        for (m1, c1) in &self.terms {
            for (m2, c2) in &other.terms {
                out.add_term(m1.checked_mul(m2)?, c1 * c2);
            }
        }
        Some(out)
    }

    /// Multiplies every coefficient by `c`.
    #[must_use]
    pub fn scale(&self, c: &Rational) -> Self {
        if c.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self.terms.iter().map(|(m, k)| (m.clone(), k * c)).collect(),
        }
    }

    /// Multiplies every term by `m`.
    #[must_use]
    pub fn mul_monomial(&self, m: &Monomial) -> Self {
        Self {
            terms: self.terms.iter().map(|(k, c)| (k.mul(m), c.clone())).collect(),
        }
    }

    /// Divides every term by `m`.
    ///
    /// Returns `None` unless `m` divides every monomial.
    #[must_use]
    pub fn div_monomial(&self, m: &Monomial) -> Option<Self> {
        let terms = self
            .terms
            .iter()
            .map(|(k, c)| k.div(m).map(|q| (q, c.clone())))
            .collect::<Option<_>>()?;
        Some(Self { terms })
    }

    /// `self ^ k` by repeated squaring.
    #[must_use]
    pub fn pow(&self, k: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut k = k;
        while k > 0 {
            if k & 1 == 1 {
                result = result.mul(&base);
            }
            k >>= 1;
            if k > 0 {
                base = base.mul(&base);
            }
        }
        result
    }

    /// `self ^ k`, or `None` if an exponent would exceed [`MAX_EXPONENT`].
    #[must_use]
    pub fn checked_pow(&self, k: u32) -> Option<Self> {
        let bound = u64::from(self.max_exponent()) * u64::from(k);
        (bound <= u64::from(MAX_EXPONENT)).then(|| self.pow(k))
    }

    /// Greatest common monomial divisor of all terms.
    #[must_use]
    pub fn monomial_content(&self) -> Monomial {
        let mut iter = self.terms.keys();
        let Some(first) = iter.next() else {
            return Monomial::one();
        };
        let mut g = first.clone();
        for m in iter {
            if g.is_one() {
                break;
            }
            g = g.gcd(m);
        }
        g
    }

    /// Rational content, signed like the leading coefficient, so that
    /// dividing by it leaves integer coefficients with gcd 1 and a positive
    /// leading coefficient.
    #[must_use]
    pub fn numeric_content(&self) -> Rational {
        let mut num = Integer::zero();
        let mut den = Integer::one();
        for c in self.terms.values() {
            num = num.gcd(&c.numerator());
            den = den.lcm(&c.denominator());
        }
        let content = Rational::from_integers(num, den).unwrap_or_else(Rational::one);
        if content.is_zero() {
            return Rational::one();
        }
        match self.leading() {
            Some((_, c)) if c.is_negative() => -content,
            _ => content,
        }
    }

    /// Exact division: `Some(q)` with `self == q * divisor`, or `None`.
    #[must_use]
    pub fn div_exact(&self, divisor: &Self) -> Option<Self> {
        let (lm, lc) = divisor.leading()?;
        let lc_inv = lc.checked_recip()?;
        let mut remainder = self.clone();
        let mut quotient = Self::zero();
        while let Some((rm, rc)) = remainder.leading() {
            let m = rm.div(lm)?;
            let c = rc * &lc_inv;
            let step = Self::term(c, m);
            remainder = remainder.sub(&step.mul(divisor));
            quotient = quotient.add(&step);
        }
        Some(quotient)
    }

    /// Maps every term to a polynomial and sums the results.
    #[must_use]
    pub fn flat_map_terms<F>(&self, f: F) -> Self
    where
        F: Fn(&Monomial, &Rational) -> Self,
    {
        let mut out = Self::zero();
        for (m, c) in &self.terms {
            for (m2, c2) in f(m, c).terms {
                out.add_term(m2, c2);
            }
        }
        out
    }

    /// Renders the polynomial as a sum, leading term first.
    #[must_use]
    pub fn to_expr(&self) -> Expr {
        Expr::add(
            self.terms
                .iter()
                .rev()
                .map(|(m, c)| Expr::mul([Expr::number(c.clone()), m.to_expr()])),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagrange_core::SymbolRegistry;

    fn atoms() -> (SymbolRegistry, Expr, Expr) {
        let mut reg = SymbolRegistry::new();
        let x = Expr::symbol(reg.declare_parameter("x").unwrap().symbol());
        let y = Expr::symbol(reg.declare_parameter("y").unwrap().symbol());
        (reg, x, y)
    }

    fn q(n: i64) -> Rational {
        Rational::from(n)
    }

    #[test]
    fn test_monomial_order() {
        let (_reg, x, y) = atoms();
        let mx = Monomial::atom(x.clone(), 1);
        let my = Monomial::atom(y.clone(), 1);
        // x is declared first and is the more significant atom.
        assert!(mx > my);
        assert!(my.pow(5) < mx);
        assert!(Monomial::one() < my);
        assert!(mx.mul(&my) > mx);
    }

    #[test]
    fn test_monomial_division() {
        let (_reg, x, y) = atoms();
        let m = Monomial::atom(x.clone(), 2).mul(&Monomial::atom(y.clone(), 1));
        let d = Monomial::atom(x.clone(), 1);
        assert_eq!(
            m.div(&d),
            Some(Monomial::atom(x.clone(), 1).mul(&Monomial::atom(y, 1)))
        );
        assert_eq!(d.div(&m), None);
        assert_eq!(m.gcd(&Monomial::atom(x, 5)), d);
    }

    #[test]
    fn test_arithmetic() {
        let (_reg, x, y) = atoms();
        let px = Poly::atom(x.clone());
        let py = Poly::atom(y);
        // (x + y)(x - y) = x^2 - y^2
        let prod = px.add(&py).mul(&px.sub(&py));
        assert_eq!(prod, px.pow(2).sub(&py.pow(2)));
        assert!(px.sub(&px).is_zero());
        assert_eq!(px.scale(&q(3)).as_constant(), None);
        assert_eq!(Poly::constant(q(4)).as_constant(), Some(q(4)));
    }

    #[test]
    fn test_contents() {
        let (_reg, x, y) = atoms();
        let px = Poly::atom(x.clone());
        let py = Poly::atom(y.clone());
        // -6 x^2 y + 4 x y^2
        let p = px
            .pow(2)
            .mul(&py)
            .scale(&q(-6))
            .add(&px.mul(&py.pow(2)).scale(&q(4)));
        assert_eq!(p.numeric_content(), q(-2));
        assert_eq!(
            p.monomial_content(),
            Monomial::atom(x, 1).mul(&Monomial::atom(y, 1))
        );
    }

    #[test]
    fn test_exponents_are_bounded() {
        let (_reg, x, y) = atoms();
        let m = Monomial::atom(x.clone(), 70_000).mul(&Monomial::atom(y, 1));
        assert_eq!(m.checked_pow(70_000), None);
        assert_eq!(m.checked_pow(2).map(|p| p.degree_of(&x)), Some(140_000));
        let big = Monomial::atom(x.clone(), MAX_EXPONENT);
        assert_eq!(big.checked_mul(&Monomial::atom(x.clone(), 1)), None);
        assert_eq!(big.pow(u32::MAX).degree_of(&x), u32::MAX);

        let p = Poly::term(q(1), m).add(&Poly::one());
        assert!(p.checked_pow(70_000).is_none());
        assert!(p.checked_mul(&Poly::term(q(1), big)).is_none());
        assert_eq!(p.checked_pow(2).map(|p| p.len()), Some(3));
    }

    #[test]
    fn test_div_exact() {
        let (_reg, x, y) = atoms();
        let px = Poly::atom(x);
        let py = Poly::atom(y);
        let a = px.add(&py);
        let b = px.sub(&py.scale(&q(2)));
        let prod = a.mul(&b);
        assert_eq!(prod.div_exact(&a), Some(b.clone()));
        assert_eq!(prod.div_exact(&b), Some(a.clone()));
        assert_eq!(a.div_exact(&b), None);
        assert_eq!(prod.add(&Poly::one()).div_exact(&a), None);
    }
}
