//! Trigonometric normalization.
//!
//! Sines and cosines are expanded down to atoms `sin(u)` and `cos(u)` where
//! `u` is a monomial, and every `sin(u)^k` with `k >= 2` is rewritten with
//! `sin(u)^2 = 1 - cos(u)^2`. Polynomials reduced this way have sine degree
//! at most one per angle, which makes them a unique representative modulo
//! the Pythagorean identity: an expression is zero exactly when its reduced
//! numerator is the zero polynomial.

use lagrange_core::{Expr, ExprNode, Function, Rational};
use num_traits::{One, Zero};

use crate::poly::{Monomial, Poly};

/// Returns the argument of a `sin(u)` atom.
fn sine_argument(atom: &Expr) -> Option<&Expr> {
    match atom.node() {
        ExprNode::Function {
            func: Function::Sin,
            args,
        } if args.len() == 1 => Some(&args[0]),
        _ => None,
    }
}

/// Rewrites `sin(u)^k` (`k >= 2`) as `sin(u)^(k mod 2) * (1 - cos(u)^2)^(k div 2)`.
#[must_use]
pub fn reduce_pythagorean(p: &Poly) -> Poly {
    let reducible = p
        .terms()
        .any(|(m, _)| m.iter().any(|(a, e)| *e >= 2 && sine_argument(a).is_some()));
    if !reducible {
        return p.clone();
    }
    p.flat_map_terms(|m, c| {
        let mut rest = m.clone();
        let mut factor = Poly::one();
        for (atom, e) in m.iter() {
            if *e < 2 {
                continue;
            }
            if let Some(u) = sine_argument(atom) {
                rest = rest.with_degree(atom, e % 2);
                let cos_sq = Poly::term(Rational::one(), Monomial::atom(Expr::cos(u.clone()), 2));
                factor = factor.mul(&Poly::one().sub(&cos_sq).pow(e / 2));
            }
        }
        factor.mul(&Poly::term(c.clone(), rest))
    })
}

/// `(sin a, cos a)` for an angle given as a polynomial.
///
/// Each term `c * m` of the angle contributes `sin(|c| m)` and
/// `cos(|c| m)`. Integer multiples up to `multiple_angle_limit` are
/// expanded in terms of `sin(m)` and `cos(m)`; other multiples stay atoms.
/// Terms are combined with the angle addition formulas.
#[must_use]
pub fn sin_cos(angle: &Poly, multiple_angle_limit: u32) -> (Poly, Poly) {
    let mut sin = Poly::zero();
    let mut cos = Poly::one();
    for (m, c) in angle.terms() {
        let (s, k) = term_sin_cos(m, c, multiple_angle_limit);
        let next_sin = sin.mul(&k).add(&cos.mul(&s));
        let next_cos = cos.mul(&k).sub(&sin.mul(&s));
        sin = reduce_pythagorean(&next_sin);
        cos = reduce_pythagorean(&next_cos);
    }
    (sin, cos)
}

fn term_sin_cos(m: &Monomial, c: &Rational, multiple_angle_limit: u32) -> (Poly, Poly) {
    let magnitude = c.abs();
    let multiple = magnitude
        .to_i64()
        .and_then(|n| u32::try_from(n).ok())
        .filter(|&n| !m.is_one() && n <= multiple_angle_limit.max(1));

    let (s, k) = match multiple {
        Some(n) => {
            let u = m.to_expr();
            let base_sin = Poly::atom(Expr::sin(u.clone()));
            let base_cos = Poly::atom(Expr::cos(u));
            multiple_angle(&base_sin, &base_cos, n)
        }
        None => {
            let angle = Expr::mul([Expr::number(magnitude), m.to_expr()]);
            (
                atom_or_constant(Expr::sin(angle.clone())),
                atom_or_constant(Expr::cos(angle)),
            )
        }
    };
    if c.is_negative() {
        (s.neg(), k)
    } else {
        (s, k)
    }
}

/// `(sin(n u), cos(n u))` from `(sin u, cos u)` by repeated addition.
fn multiple_angle(base_sin: &Poly, base_cos: &Poly, n: u32) -> (Poly, Poly) {
    let mut sin = base_sin.clone();
    let mut cos = base_cos.clone();
    for _ in 1..n {
        let next_sin = sin.mul(base_cos).add(&cos.mul(base_sin));
        let next_cos = cos.mul(base_cos).sub(&sin.mul(base_sin));
        sin = reduce_pythagorean(&next_sin);
        cos = reduce_pythagorean(&next_cos);
    }
    (sin, cos)
}

fn atom_or_constant(e: Expr) -> Poly {
    match e.as_number() {
        Some(n) if n.is_zero() => Poly::zero(),
        Some(n) => Poly::constant(n.clone()),
        None => Poly::atom(e),
    }
}
