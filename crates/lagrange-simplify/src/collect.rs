//! Collection of an expression as an affine form in chosen symbols.
//!
//! `e = c_1 x_1 + ... + c_n x_n + r` where no `c_i` and not `r` depends on
//! any `x_j`. Used to read the mass matrix and the right-hand side off the
//! Euler–Lagrange equations.

use lagrange_core::{Expr, ExprNode, Symbol};
use thiserror::Error;

use crate::engine::Simplifier;
use crate::poly::Poly;
use crate::rational_func::Frac;

/// Why an expression could not be collected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollectError {
    /// The expression is not affine in the symbol.
    #[error("expression is not affine in {symbol}")]
    NonAffine {
        /// The offending symbol.
        symbol: String,
    },
}

/// An affine form `sum(coefficients[i] * x_i) + constant`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinearForm {
    /// One coefficient per collected symbol, in the order given.
    pub coefficients: Vec<Frac>,
    /// The part free of every collected symbol.
    pub constant: Frac,
}

impl Simplifier {
    /// Collects `expr` as an affine form in `symbols`.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError::NonAffine`] if a symbol occurs in a
    /// denominator, inside a function or power, with degree above one, or
    /// multiplied by another collected symbol.
    pub fn collect_linear(
        &self,
        expr: &Expr,
        symbols: &[Symbol],
    ) -> Result<LinearForm, CollectError> {
        let frac = self.canonical(expr);
        let non_affine = |s: &Symbol| CollectError::NonAffine {
            symbol: s.name().to_string(),
        };

        if let Some(s) = symbols
            .iter()
            .find(|s| frac.denominator().any_atom(|a| a.contains_symbol(s)))
        {
            return Err(non_affine(s));
        }

        let mut parts = vec![Poly::zero(); symbols.len()];
        let mut constant = Poly::zero();
        for (m, c) in frac.numerator().terms() {
            let mut found: Option<(usize, &Expr)> = None;
            for (atom, e) in m.iter() {
                let direct = match atom.node() {
                    ExprNode::Symbol(s) => symbols.iter().position(|x| x == s),
                    _ => None,
                };
                match direct {
                    Some(i) => {
                        if *e > 1 || found.is_some() {
                            return Err(non_affine(&symbols[i]));
                        }
                        found = Some((i, atom));
                    }
                    None => {
                        if let Some(s) = symbols.iter().find(|s| atom.contains_symbol(s)) {
                            return Err(non_affine(s));
                        }
                    }
                }
            }
            match found {
                Some((i, atom)) => {
                    let rest = m.with_degree(atom, 0);
                    parts[i] = parts[i].add(&Poly::term(c.clone(), rest));
                }
                None => constant = constant.add(&Poly::term(c.clone(), m.clone())),
            }
        }

        let den = frac.denominator();
        let coefficients = parts
            .into_iter()
            .map(|p| Frac::normalized(p, den.clone()))
            .collect();
        tracing::trace!(symbols = symbols.len(), "collected affine form");
        Ok(LinearForm {
            coefficients,
            constant: Frac::normalized(constant, den.clone()),
        })
    }
}

impl LinearForm {
    /// Reassembles the form as an expression.
    #[must_use]
    pub fn to_expr(&self, simplifier: &Simplifier, symbols: &[Symbol]) -> Expr {
        let terms = self
            .coefficients
            .iter()
            .zip(symbols)
            .map(|(c, s)| Expr::mul([simplifier.render(c), Expr::symbol(s)]))
            .chain(std::iter::once(simplifier.render(&self.constant)));
        Expr::add(terms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::equivalent;
    use lagrange_core::{parse, SymbolRegistry};

    fn setup() -> (SymbolRegistry, Vec<Symbol>) {
        let mut reg = SymbolRegistry::new();
        let a = reg.declare_coordinate("a").unwrap();
        let b = reg.declare_coordinate("b").unwrap();
        reg.declare_parameter("m").unwrap();
        let accels = vec![a.acceleration().clone(), b.acceleration().clone()];
        (reg, accels)
    }

    #[test]
    fn test_collect_affine() {
        let (reg, accels) = setup();
        let s = Simplifier::new();
        let e = parse("m*dda + cos(a - b)*ddb + m*sin(a) - 3", &reg).unwrap();
        let form = s.collect_linear(&e, &accels).unwrap();
        assert_eq!(s.render(&form.coefficients[0]), parse("m", &reg).unwrap());
        assert!(equivalent(
            &s.render(&form.coefficients[1]),
            &parse("cos(a - b)", &reg).unwrap()
        ));
        assert!(equivalent(
            &s.render(&form.constant),
            &parse("m*sin(a) - 3", &reg).unwrap()
        ));
        assert!(equivalent(&form.to_expr(&s, &accels), &e));
    }

    #[test]
    fn test_collect_with_denominator() {
        let (reg, accels) = setup();
        let s = Simplifier::new();
        let e = parse("(dda + db^2)/m", &reg).unwrap();
        let form = s.collect_linear(&e, &accels).unwrap();
        assert!(equivalent(
            &s.render(&form.coefficients[0]),
            &parse("1/m", &reg).unwrap()
        ));
        assert!(form.coefficients[1].is_zero());
    }

    #[test]
    fn test_non_affine_rejected() {
        let (reg, accels) = setup();
        let s = Simplifier::new();
        for input in ["dda^2", "dda*ddb", "sin(dda)", "1/(m + ddb)"] {
            let e = parse(input, &reg).unwrap();
            assert!(
                matches!(s.collect_linear(&e, &accels), Err(CollectError::NonAffine { .. })),
                "{input}"
            );
        }
    }
}
