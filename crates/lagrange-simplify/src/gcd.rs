//! Greatest common divisors of multivariate polynomials.
//!
//! A polynomial is viewed as univariate in its most significant atom with
//! coefficients in the remaining atoms. The gcd of the contents is found
//! recursively and the primitive parts are reduced with a primitive
//! pseudo-remainder sequence, so every intermediate polynomial stays
//! primitive and coefficients do not grow between steps.

use std::collections::BTreeMap;

use lagrange_core::{Expr, Rational};
use num_traits::One;

use crate::poly::{Monomial, Poly};

impl Poly {
    /// Greatest common divisor.
    ///
    /// The result has integer coefficients with gcd 1 and a positive
    /// leading coefficient. `gcd(0, 0)` is zero and the gcd with a non-zero
    /// constant is one.
    #[must_use]
    pub fn gcd(&self, other: &Self) -> Self {
        gcd(self, other)
    }

    /// Largest exponent of `atom` in any term.
    #[must_use]
    pub fn degree_in(&self, atom: &Expr) -> u32 {
        self.terms()
            .map(|(m, _)| m.degree_of(atom))
            .max()
            .unwrap_or(0)
    }

    /// Coefficients with respect to `atom`, keyed by its exponent. The
    /// coefficients do not contain `atom`.
    #[must_use]
    pub fn coefficients_in(&self, atom: &Expr) -> BTreeMap<u32, Poly> {
        let mut out: BTreeMap<u32, Poly> = BTreeMap::new();
        for (m, c) in self.terms() {
            out.entry(m.degree_of(atom))
                .or_default()
                .add_term(m.with_degree(atom, 0), c.clone());
        }
        out
    }

    /// Divides out the numeric content, leaving integer coefficients with
    /// gcd 1 and a positive leading coefficient.
    #[must_use]
    pub fn primitive(&self) -> Self {
        if self.is_zero() {
            return Self::zero();
        }
        let inv = self
            .numeric_content()
            .checked_recip()
            .unwrap_or_else(Rational::one);
        self.scale(&inv)
    }
}

fn gcd(a: &Poly, b: &Poly) -> Poly {
    if a.is_zero() {
        return b.primitive();
    }
    if b.is_zero() || a == b {
        return a.primitive();
    }
    if a.as_constant().is_some() || b.as_constant().is_some() {
        return Poly::one();
    }
    if a.len() == 1 || b.len() == 1 {
        // Only monomials divide a monomial.
        let m = a.monomial_content().gcd(&b.monomial_content());
        return Poly::term(Rational::one(), m);
    }

    let Some(v) = main_atom(a, b) else {
        return Poly::one();
    };
    match (a.degree_in(&v), b.degree_in(&v)) {
        (0, _) => gcd(a, &content_in(b, &v)),
        (_, 0) => gcd(&content_in(a, &v), b),
        _ => {
            let ca = content_in(a, &v);
            let cb = content_in(b, &v);
            let content = gcd(&ca, &cb);
            let pa = a.div_exact(&ca).unwrap_or_else(|| a.clone());
            let pb = b.div_exact(&cb).unwrap_or_else(|| b.clone());
            content.mul(&primitive_gcd(pa, pb, &v)).primitive()
        }
    }
}

/// The most significant atom of either polynomial.
fn main_atom(a: &Poly, b: &Poly) -> Option<Expr> {
    a.terms()
        .chain(b.terms())
        .filter_map(|(m, _)| m.iter().next().map(|(atom, _)| atom))
        .min()
        .cloned()
}

/// Gcd of the coefficients with respect to `v`.
fn content_in(p: &Poly, v: &Expr) -> Poly {
    let mut coefficients = p.coefficients_in(v).into_values();
    let Some(first) = coefficients.next() else {
        return Poly::zero();
    };
    let mut g = first.primitive();
    for c in coefficients {
        if g.is_one() {
            break;
        }
        g = gcd(&g, &c);
    }
    g
}

/// Gcd of two polynomials that are primitive with respect to `v` and both
/// depend on `v`.
fn primitive_gcd(a: Poly, b: Poly, v: &Expr) -> Poly {
    let (mut p, mut q) = if a.degree_in(v) >= b.degree_in(v) {
        (a, b)
    } else {
        (b, a)
    };
    loop {
        let r = pseudo_remainder(&p, &q, v);
        if r.is_zero() {
            return q;
        }
        if r.degree_in(v) == 0 {
            return Poly::one();
        }
        let c = content_in(&r, v);
        p = q;
        q = r.div_exact(&c).unwrap_or(r);
    }
}

/// `lc(b)^k * a mod b` with respect to `v`, scaled to be primitive.
fn pseudo_remainder(a: &Poly, b: &Poly, v: &Expr) -> Poly {
    let d = b.degree_in(v);
    let lead = b.coefficients_in(v).remove(&d).unwrap_or_else(Poly::one);
    let mut r = a.clone();
    loop {
        let e = r.degree_in(v);
        if r.is_zero() || e < d {
            return r;
        }
        let r_lead = r.coefficients_in(v).remove(&e).unwrap_or_else(Poly::zero);
        let shift = Monomial::atom(v.clone(), e - d);
        r = r
            .mul(&lead)
            .sub(&b.mul(&r_lead).mul_monomial(&shift))
            .primitive();
    }
}

#[cfg(test)]
mod tests {
    use lagrange_core::{parse, SymbolRegistry};

    use crate::canonical::Canonicalizer;
    use crate::engine::SimplifierConfig;
    use crate::poly::Poly;

    fn registry() -> SymbolRegistry {
        let mut reg = SymbolRegistry::new();
        for name in ["x", "y", "z"] {
            reg.declare_parameter(name).unwrap();
        }
        reg
    }

    /// Expanded polynomial of a product-free input.
    fn poly(input: &str, reg: &SymbolRegistry) -> Poly {
        let config = SimplifierConfig::default();
        let frac = Canonicalizer::new(&config).to_frac(&parse(input, reg).unwrap());
        assert!(frac.denominator().is_one());
        frac.numerator().clone()
    }

    #[test]
    fn test_univariate() {
        let reg = registry();
        let g = poly("x^2 - 1", &reg).gcd(&poly("x^2 + 2*x + 1", &reg));
        assert_eq!(g, poly("x + 1", &reg));
        let g = poly("x^3 - x", &reg).gcd(&poly("2*x^2 - 2", &reg));
        assert_eq!(g, poly("x^2 - 1", &reg));
    }

    #[test]
    fn test_shared_sum_factor() {
        let reg = registry();
        let a = poly("x^2 + x*y - x - y", &reg); // (x + y)(x - 1)
        let b = poly("x^2 + x*y + x + y", &reg); // (x + y)(x + 1)
        assert_eq!(a.gcd(&b), poly("x + y", &reg));
    }

    #[test]
    fn test_factor_in_minor_atom() {
        let reg = registry();
        // (y + z)(x + 1) and (y + z)(x - z)
        let a = poly("x*y + x*z + y + z", &reg);
        let b = poly("x*y + x*z - y*z - z^2", &reg);
        assert_eq!(a.gcd(&b), poly("y + z", &reg));
    }

    #[test]
    fn test_coprime_and_trivial() {
        let reg = registry();
        let a = poly("x + y", &reg);
        let b = poly("x - y", &reg);
        assert!(a.gcd(&b).is_one());
        assert!(a.gcd(&Poly::one()).is_one());
        assert_eq!(a.gcd(&Poly::zero()), a);
        assert_eq!(poly("-2*x - 2*y", &reg).gcd(&Poly::zero()), a);
        assert_eq!(poly("x^2*y", &reg).gcd(&poly("x*y^3 + x*y", &reg)), poly("x*y", &reg));
    }
}
