//! Numeric evaluation.

use crate::error::{CoreError, Result};
use crate::expr::{Expr, ExprNode, Function};
use crate::number::Rational;
use crate::symbol::Symbol;

impl Expr {
    /// Evaluates the expression in `f64`, looking symbol values up with
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MissingValue`] for unbound symbols,
    /// [`CoreError::UnsupportedFunction`] for uninterpreted functions and
    /// [`CoreError::UnexpandedDerivative`] for time-derivative markers.
    pub fn evaluate<F>(&self, lookup: &F) -> Result<f64>
    where
        F: Fn(&Symbol) -> Option<f64>,
    {
        match self.node() {
            ExprNode::Number(n) => Ok(n.to_f64()),
            ExprNode::Symbol(s) => lookup(s).ok_or_else(|| CoreError::MissingValue {
                name: s.name().to_string(),
            }),
            ExprNode::Add(terms) => terms
                .iter()
                .try_fold(0.0, |acc, t| Ok(acc + t.evaluate(lookup)?)),
            ExprNode::Mul(factors) => factors
                .iter()
                .try_fold(1.0, |acc, t| Ok(acc * t.evaluate(lookup)?)),
            ExprNode::Pow { base, exp } => {
                let b = base.evaluate(lookup)?;
                let small = exp
                    .as_number()
                    .and_then(Rational::to_i64)
                    .and_then(|k| i32::try_from(k).ok());
                match small {
                    Some(k) => Ok(b.powi(k)),
                    None => Ok(b.powf(exp.evaluate(lookup)?)),
                }
            }
            ExprNode::Function { func, args } => {
                let [arg] = args.as_slice() else {
                    return Err(CoreError::UnsupportedFunction {
                        function: func.name().to_string(),
                    });
                };
                let x = arg.evaluate(lookup)?;
                apply(func, x)
            }
            ExprNode::Derivative(_) => Err(CoreError::UnexpandedDerivative),
        }
    }
}

/// Applies a built-in unary function to an `f64`.
///
/// # Errors
///
/// Returns [`CoreError::UnsupportedFunction`] for [`Function::Other`].
pub fn apply(func: &Function, x: f64) -> Result<f64> {
    Ok(match func {
        Function::Sin => x.sin(),
        Function::Cos => x.cos(),
        Function::Tan => x.tan(),
        Function::Exp => x.exp(),
        Function::Log => x.ln(),
        Function::Asin => x.asin(),
        Function::Acos => x.acos(),
        Function::Atan => x.atan(),
        Function::Sinh => x.sinh(),
        Function::Cosh => x.cosh(),
        Function::Tanh => x.tanh(),
        Function::Other(name) => {
            return Err(CoreError::UnsupportedFunction {
                function: name.to_string(),
            })
        }
    })
}
