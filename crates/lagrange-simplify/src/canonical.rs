//! Conversion between expression trees and the canonical rational form.
//!
//! [`Canonicalizer::to_frac`] maps an [`Expr`] to a [`Frac`] over atoms and
//! [`Canonicalizer::render`] maps it back. Every atom is built from already
//! rendered sub-expressions, so rendering and converting again reaches the
//! same normal form.

use lagrange_core::{Expr, ExprNode, Function, Integer, Rational};
use num_traits::{One, Zero};

use crate::engine::SimplifierConfig;
use crate::poly::{Monomial, Poly, MAX_EXPONENT};
use crate::rational_func::Frac;
use crate::trig;

/// Converts expressions to and from [`Frac`] under a configuration.
pub struct Canonicalizer<'a> {
    config: &'a SimplifierConfig,
}

impl<'a> Canonicalizer<'a> {
    /// A converter using `config`.
    #[must_use]
    pub fn new(config: &'a SimplifierConfig) -> Self {
        Self { config }
    }

    /// Canonical rational form of `expr`.
    #[must_use]
    pub fn to_frac(&self, expr: &Expr) -> Frac {
        match expr.node() {
            ExprNode::Number(n) => Frac::from(n.clone()),
            ExprNode::Symbol(_) => Frac::from_poly(Poly::atom(expr.clone())),
            ExprNode::Add(terms) => {
                let sum = terms
                    .iter()
                    .fold(Frac::zero(), |acc, t| acc.add(&self.to_frac(t)));
                self.settle(sum)
            }
            ExprNode::Mul(factors) => {
                let mut product = Frac::one();
                for factor in factors {
                    let factor = self.to_frac(factor);
                    product = match product.checked_mul(&factor) {
                        Some(p) => p,
                        // Exponents out of range: keep the factor opaque.
                        None => product.mul(&atom_or_constant(self.render(&factor))),
                    };
                    if product.is_zero() {
                        return product;
                    }
                }
                self.settle(product)
            }
            ExprNode::Pow { base, exp } => {
                let power = self.power(base, exp);
                self.settle(power)
            }
            ExprNode::Function { func, args } => self.function(func, args),
            ExprNode::Derivative(inner) => {
                let inner = self.render(&self.to_frac(inner));
                atom_or_constant(Expr::derivative(inner))
            }
        }
    }

    /// Renders a canonical form as an expression.
    ///
    /// The result has the shape `c * atoms^e * (N) * (D)^-1` where `c` is a
    /// rational, the atom powers are the monomial contents of numerator and
    /// denominator, and `N`, `D` are primitive sums.
    #[must_use]
    pub fn render(&self, frac: &Frac) -> Expr {
        if frac.is_zero() {
            return Expr::zero();
        }
        let (cn, mn, pn) = split_content(frac.numerator());
        let (cd, md, pd) = split_content(frac.denominator());
        let coefficient = cd.checked_recip().map_or(cn.clone(), |inv| &cn * &inv);

        let mut factors = vec![Expr::number(coefficient)];
        factors.extend(mn.iter().map(|(a, e)| Expr::powi(a.clone(), i64::from(*e))));
        factors.extend(md.iter().map(|(a, e)| Expr::powi(a.clone(), -i64::from(*e))));
        if !pn.is_one() {
            factors.push(pn.to_expr());
        }
        if !pd.is_one() {
            factors.push(Expr::powi(pd.to_expr(), -1));
        }
        Expr::mul(factors)
    }

    fn power(&self, base: &Expr, exp: &Expr) -> Frac {
        let exp = self.render(&self.to_frac(exp));
        let Some(r) = exp.as_number() else {
            let base = self.render(&self.to_frac(base));
            return atom_or_constant(Expr::pow(base, exp));
        };

        let base_frac = self.to_frac(base);
        if r.is_integer() {
            return match r.to_i64() {
                Some(k) => self.int_power(&base_frac, k),
                None => atom_or_constant(Expr::pow(self.render(&base_frac), exp.clone())),
            };
        }

        // b^(p/q) = (b^(1/q))^p
        if base_frac.is_zero() && !r.is_negative() {
            return Frac::zero();
        }
        let p = r.numerator();
        let q = r.denominator();
        let root_exp = Rational::from_integers(Integer::new(1), q).unwrap_or_else(Rational::one);
        let root = atom_or_constant(Expr::pow(self.render(&base_frac), Expr::number(root_exp)));
        match p.to_i64() {
            Some(p) => self.int_power(&root, p),
            None => atom_or_constant(Expr::pow(self.render(&base_frac), exp.clone())),
        }
    }

    /// `frac ^ k`. Multi-term polynomials are expanded only up to
    /// `expand_limit`; higher powers keep the primitive polynomial as an
    /// atom.
    fn int_power(&self, frac: &Frac, k: i64) -> Frac {
        if k == 0 {
            return Frac::one();
        }
        if frac.is_zero() {
            return if k > 0 {
                Frac::zero()
            } else {
                atom_or_constant(Expr::powi(Expr::zero(), k))
            };
        }
        // Out of range powers become atoms. Negative powers are kept as the
        // inverse of the positive one so that they cancel against it.
        let opaque = || match k.checked_abs() {
            Some(m) if k < 0 => atom_or_constant(Expr::powi(self.render(frac), m))
                .inv()
                .unwrap_or_else(Frac::zero),
            _ => atom_or_constant(Expr::powi(self.render(frac), k)),
        };
        let Some(n) = u32::try_from(k.unsigned_abs())
            .ok()
            .filter(|n| *n <= MAX_EXPONENT)
        else {
            return opaque();
        };

        let (cn, mn, pn) = split_content(frac.numerator());
        let (cd, md, pd) = split_content(frac.denominator());
        let coefficient = cd.checked_recip().map_or(cn.clone(), |inv| &cn * &inv);
        let (Some(mn), Some(md), Some(coefficient)) = (
            mn.checked_pow(n),
            md.checked_pow(n),
            coefficient.powi(i64::from(n)),
        ) else {
            return opaque();
        };
        let monomials = Frac::from_poly(Poly::term(Rational::one(), mn))
            .div(&Frac::from_poly(Poly::term(Rational::one(), md)))
            .unwrap_or_else(Frac::one);

        let raised = Frac::constant(coefficient)
            .mul(&monomials)
            .mul(&self.raise_primitive(&pn, n))
            .div(&self.raise_primitive(&pd, n))
            .unwrap_or_else(Frac::zero);

        if k < 0 {
            raised.inv().unwrap_or_else(Frac::zero)
        } else {
            raised
        }
    }

    fn raise_primitive(&self, p: &Poly, n: u32) -> Frac {
        let expanded = (p.len() <= 1 || n <= self.config.expand_limit)
            .then(|| p.checked_pow(n))
            .flatten();
        match expanded {
            Some(raised) => Frac::from_poly(raised),
            None => Frac::from_poly(Poly::term(Rational::one(), Monomial::atom(p.to_expr(), n))),
        }
    }

    fn function(&self, func: &Function, args: &[Expr]) -> Frac {
        if self.config.trig && func.is_trigonometric() && args.len() == 1 {
            return self.trig(func, &args[0]);
        }
        let args: Vec<Expr> = args
            .iter()
            .map(|a| self.render(&self.to_frac(a)))
            .collect();
        atom_or_constant(Expr::func(func.clone(), args))
    }

    fn trig(&self, func: &Function, arg: &Expr) -> Frac {
        let angle = self.to_frac(arg);
        let (sin, cos) = if angle.denominator().is_one() {
            let (s, c) = trig::sin_cos(angle.numerator(), self.config.multiple_angle_limit);
            (Frac::from_poly(s), Frac::from_poly(c))
        } else {
            // sin(-a) = -sin(a), cos(-a) = cos(a)
            let negative = angle
                .numerator()
                .leading()
                .is_some_and(|(_, c)| c.is_negative());
            let magnitude = if negative { angle.neg() } else { angle };
            let u = self.render(&magnitude);
            let s = atom_or_constant(Expr::sin(u.clone()));
            let c = atom_or_constant(Expr::cos(u));
            (if negative { s.neg() } else { s }, c)
        };
        match func {
            Function::Sin => sin,
            Function::Cos => cos,
            _ => sin
                .div(&cos)
                .unwrap_or_else(|| atom_or_constant(Expr::func(func.clone(), [self.render(&self.to_frac(arg))]))),
        }
    }

    /// Rewrites atoms that have a simpler equivalent at their current
    /// exponent: roots raised to at least their index, roots whose exponent
    /// shares a factor with the index, and polynomial atoms whose exponent
    /// fell back within `expand_limit`.
    fn settle(&self, frac: Frac) -> Frac {
        let unsettled = |p: &Poly| {
            p.terms()
                .any(|(m, _)| m.iter().any(|(a, e)| self.is_unsettled(a, *e)))
        };
        if !unsettled(frac.numerator()) && !unsettled(frac.denominator()) {
            return frac;
        }
        let num = self.settle_poly(frac.numerator());
        let den = self.settle_poly(frac.denominator());
        num.div(&den).unwrap_or(frac)
    }

    fn is_unsettled(&self, atom: &Expr, e: u32) -> bool {
        match atom.node() {
            ExprNode::Add(_) => e <= self.config.expand_limit,
            ExprNode::Pow { exp, .. } => root_index(exp).is_some_and(|q| {
                e >= q || Integer::new(i64::from(e)).gcd(&Integer::new(i64::from(q))) != Integer::new(1)
            }),
            _ => false,
        }
    }

    fn settle_poly(&self, p: &Poly) -> Frac {
        p.terms().fold(Frac::zero(), |acc, (m, c)| {
            let term = m.iter().fold(Frac::constant(c.clone()), |t, (a, e)| {
                t.mul(&self.settle_atom(a, *e))
            });
            acc.add(&term)
        })
    }

    fn settle_atom(&self, atom: &Expr, e: u32) -> Frac {
        let plain = || Frac::from_poly(Poly::term(Rational::one(), Monomial::atom(atom.clone(), e)));
        if !self.is_unsettled(atom, e) {
            return plain();
        }
        match atom.node() {
            ExprNode::Add(_) => self.to_frac(atom).checked_pow(e).unwrap_or_else(plain),
            ExprNode::Pow { base, exp } => {
                let Some(q) = root_index(exp) else {
                    return plain();
                };
                let base_frac = self.to_frac(base);
                let whole = self.int_power(&base_frac, i64::from(e / q));
                let rest = e % q;
                if rest == 0 {
                    return whole;
                }
                let g = gcd_u32(rest, q);
                let index = Rational::from_i64(1, i64::from(q / g));
                let root = atom_or_constant(Expr::pow(base.clone(), Expr::number(index)));
                whole.mul(&self.int_power(&root, i64::from(rest / g)))
            }
            _ => plain(),
        }
    }
}

/// Splits a polynomial into `content * monomial * primitive`.
fn split_content(p: &Poly) -> (Rational, Monomial, Poly) {
    let m = p.monomial_content();
    let c = p.numeric_content();
    let inv = c.checked_recip().unwrap_or_else(Rational::one);
    let primitive = p.div_monomial(&m).unwrap_or_else(|| p.clone()).scale(&inv);
    (c, m, primitive)
}

/// `q` for an exponent `1/q` with `q >= 2`.
fn root_index(exp: &Expr) -> Option<u32> {
    let r = exp.as_number()?;
    if !r.numerator().eq(&Integer::new(1)) || r.is_integer() {
        return None;
    }
    r.denominator().to_i64().and_then(|q| u32::try_from(q).ok())
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

fn atom_or_constant(e: Expr) -> Frac {
    match e.as_number() {
        Some(n) => Frac::from(n.clone()),
        None => Frac::from_poly(Poly::atom(e)),
    }
}
