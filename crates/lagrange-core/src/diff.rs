//! Symbolic differentiation.
//!
//! [`Expr::diff`] is the partial derivative with every other symbol held
//! fixed. [`Expr::time_derivative`] is the total derivative with respect to
//! time given the rate of each time-dependent symbol, and
//! [`Expr::expand_derivatives`] uses it to eliminate `Derivative` markers.

use crate::error::{CoreError, Result};
use crate::expr::{Expr, ExprNode, Function};
use crate::symbol::Symbol;

impl Expr {
    /// Partial derivative with respect to `var`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NonDifferentiable`] for an uninterpreted
    /// function whose arguments depend on `var`, and
    /// [`CoreError::UnexpandedDerivative`] if a time-derivative marker
    /// depends on `var`.
    pub fn diff(&self, var: &Symbol) -> Result<Expr> {
        if !self.contains_symbol(var) {
            return Ok(Expr::zero());
        }
        match self.node() {
            ExprNode::Number(_) => Ok(Expr::zero()),
            ExprNode::Symbol(s) => Ok(if s == var { Expr::one() } else { Expr::zero() }),
            ExprNode::Add(terms) => {
                let parts = terms
                    .iter()
                    .map(|t| t.diff(var))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::add(parts))
            }
            ExprNode::Mul(factors) => {
                // Product rule: sum over i of f_i' * prod_{j != i} f_j.
                let mut terms = Vec::with_capacity(factors.len());
                for (i, factor) in factors.iter().enumerate() {
                    let d = factor.diff(var)?;
                    if d.is_zero() {
                        continue;
                    }
                    let others = factors
                        .iter()
                        .enumerate()
                        .filter(|&(j, _)| j != i)
                        .map(|(_, f)| f.clone());
                    terms.push(Expr::mul(std::iter::once(d).chain(others)));
                }
                Ok(Expr::add(terms))
            }
            ExprNode::Pow { base, exp } => {
                if exp.contains_symbol(var) {
                    // d(b^e) = b^e * (e' ln b + e b' / b)
                    let de = exp.diff(var)?;
                    let db = base.diff(var)?;
                    let log_b = Expr::func(Function::Log, [base.clone()]);
                    let inner = de * log_b + exp * &(db / base.clone());
                    Ok(self * &inner)
                } else {
                    let db = base.diff(var)?;
                    let lowered = Expr::pow(base.clone(), exp - &Expr::one());
                    Ok(Expr::mul([exp.clone(), lowered, db]))
                }
            }
            ExprNode::Function { func, args } => {
                let [arg] = args.as_slice() else {
                    return Err(CoreError::NonDifferentiable {
                        function: func.name().to_string(),
                    });
                };
                let outer = derivative_of(func, arg)?;
                Ok(outer * arg.diff(var)?)
            }
            ExprNode::Derivative(_) => Err(CoreError::UnexpandedDerivative),
        }
    }

    /// Total time derivative.
    ///
    /// `rates` pairs every time-dependent symbol with its time derivative.
    /// Symbols not listed are constants.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Expr::diff`].
    pub fn time_derivative(&self, rates: &[(Symbol, Expr)]) -> Result<Expr> {
        let mut terms = Vec::new();
        for (symbol, rate) in rates {
            if !self.contains_symbol(symbol) {
                continue;
            }
            let partial = self.diff(symbol)?;
            if !partial.is_zero() {
                terms.push(partial * rate.clone());
            }
        }
        Ok(Expr::add(terms))
    }

    /// Replaces every `Derivative` marker by its chain-rule expansion,
    /// innermost first.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Expr::time_derivative`].
    pub fn expand_derivatives(&self, rates: &[(Symbol, Expr)]) -> Result<Expr> {
        if !self.contains_derivative() {
            return Ok(self.clone());
        }
        Ok(match self.node() {
            ExprNode::Number(_) | ExprNode::Symbol(_) => self.clone(),
            ExprNode::Add(terms) => Expr::add(
                terms
                    .iter()
                    .map(|t| t.expand_derivatives(rates))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ExprNode::Mul(factors) => Expr::mul(
                factors
                    .iter()
                    .map(|t| t.expand_derivatives(rates))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ExprNode::Pow { base, exp } => {
                Expr::pow(base.expand_derivatives(rates)?, exp.expand_derivatives(rates)?)
            }
            ExprNode::Function { func, args } => Expr::func(
                func.clone(),
                args.iter()
                    .map(|a| a.expand_derivatives(rates))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ExprNode::Derivative(inner) => {
                inner.expand_derivatives(rates)?.time_derivative(rates)?
            }
        })
    }
}

/// `f'(arg)` for a unary function.
fn derivative_of(func: &Function, arg: &Expr) -> Result<Expr> {
    let one = Expr::one();
    let square = Expr::powi(arg.clone(), 2);
    Ok(match func {
        Function::Sin => Expr::cos(arg.clone()),
        Function::Cos => -Expr::sin(arg.clone()),
        // 1 / cos^2
        Function::Tan => Expr::powi(Expr::cos(arg.clone()), -2),
        Function::Exp => Expr::func(Function::Exp, [arg.clone()]),
        Function::Log => Expr::powi(arg.clone(), -1),
        Function::Asin => Expr::pow(one - square, Expr::rational(-1, 2)),
        Function::Acos => -Expr::pow(one - square, Expr::rational(-1, 2)),
        Function::Atan => Expr::powi(one + square, -1),
        Function::Sinh => Expr::func(Function::Cosh, [arg.clone()]),
        Function::Cosh => Expr::func(Function::Sinh, [arg.clone()]),
        Function::Tanh => one - Expr::powi(Expr::func(Function::Tanh, [arg.clone()]), 2),
        Function::Other(name) => {
            return Err(CoreError::NonDifferentiable {
                function: name.to_string(),
            })
        }
    })
}
