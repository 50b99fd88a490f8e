//! Expression to token stream.
//!
//! The exporter walks an expression and writes tokens bottom-up with the
//! usual precedence rules. Time-derivative markers are rewritten to the
//! velocity or acceleration name of their coordinate; any other construct
//! without a textual rule fails with [`ExportError::Sanitization`].
//!
//! Products are written as a numerator over a denominator, so `a*b^(-2)`
//! comes out as `a/b^2`.

use lagrange_core::{Expr, ExprNode, Function, Rational, Symbol, SymbolRegistry, SymbolRole};
use lagrange_mechanics::Derivation;
use num_traits::One;

use crate::config::ExportConfig;
use crate::error::{ExportError, Result};
use crate::token::{ExportedExpression, Token};

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

/// Turns expressions into sanitized token streams.
#[derive(Clone, Debug, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// An exporter with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An exporter with `config`.
    #[must_use]
    pub fn with_config(config: ExportConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// The exported spelling of `symbol`.
    #[must_use]
    pub fn exported_name(&self, symbol: &Symbol) -> String {
        self.renamed(symbol.name())
    }

    fn renamed(&self, name: &str) -> String {
        self.config
            .renames
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Exports one expression of `registry`'s session.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Sanitization`] for uninterpreted functions,
    /// functions of several arguments and derivative markers around
    /// anything but a coordinate or its velocity.
    pub fn export(&self, registry: &SymbolRegistry, expr: &Expr) -> Result<ExportedExpression> {
        let mut writer = Writer {
            exporter: self,
            registry,
            out: Vec::new(),
        };
        writer.emit(expr)?;
        let exported =
            ExportedExpression::new(writer.out, self.config.power, &self.config.log_name)?;
        tracing::trace!(tokens = exported.tokens().len(), "expression exported");
        Ok(exported)
    }

    /// Exports every solved acceleration of a finished derivation as
    /// ordered `(coordinate, expression)` pairs.
    ///
    /// The derivation is only borrowed, so it stays available when export
    /// fails.
    ///
    /// # Errors
    ///
    /// Fails with the first export error.
    pub fn export_derivation(
        &self,
        registry: &SymbolRegistry,
        derivation: &Derivation,
    ) -> Result<Vec<(String, ExportedExpression)>> {
        let exported = derivation
            .accelerations()
            .iter()
            .map(|a| Ok((a.coordinate().to_string(), self.export(registry, a.expr())?)))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = exported.len(), "accelerations exported");
        Ok(exported)
    }
}

struct Writer<'a> {
    exporter: &'a Exporter,
    registry: &'a SymbolRegistry,
    out: Vec<Token>,
}

impl Writer<'_> {
    fn emit_prec(&mut self, expr: &Expr, min_prec: u8) -> Result<()> {
        if precedence(expr) < min_prec {
            self.out.push(Token::LParen);
            self.emit(expr)?;
            self.out.push(Token::RParen);
            Ok(())
        } else {
            self.emit(expr)
        }
    }

    fn emit(&mut self, expr: &Expr) -> Result<()> {
        match expr.node() {
            ExprNode::Number(n) => {
                if n.is_negative() {
                    self.out.push(Token::Neg);
                }
                self.number(&n.abs());
                Ok(())
            }
            ExprNode::Symbol(s) => {
                self.out.push(Token::Name(self.exporter.exported_name(s)));
                Ok(())
            }
            ExprNode::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i == 0 {
                        self.emit_prec(term, PREC_ADD)?;
                    } else if leading_negative(term) {
                        self.out.push(Token::Minus);
                        self.emit_prec(&-term, PREC_MUL)?;
                    } else {
                        self.out.push(Token::Plus);
                        self.emit_prec(term, PREC_MUL)?;
                    }
                }
                Ok(())
            }
            ExprNode::Mul(factors) => self.product(factors),
            ExprNode::Pow { base, exp } => {
                if let Some(e) = exp.as_number() {
                    if e.is_negative() {
                        return self.product(std::slice::from_ref(expr));
                    }
                    if *e == Rational::from_i64(1, 2) {
                        self.out.push(Token::Function("sqrt".to_string()));
                        self.out.push(Token::LParen);
                        self.emit(base)?;
                        self.out.push(Token::RParen);
                        return Ok(());
                    }
                }
                self.emit_prec(base, PREC_ATOM)?;
                self.out.push(Token::Power);
                self.emit_prec(exp, PREC_ATOM)
            }
            ExprNode::Function { func, args } => {
                let name = match func {
                    Function::Other(name) => {
                        return Err(ExportError::Sanitization {
                            construct: format!("uninterpreted function `{name}`"),
                        })
                    }
                    Function::Log => self.exporter.config.log_name.clone(),
                    f => f.name().to_string(),
                };
                let [arg] = args.as_slice() else {
                    return Err(ExportError::Sanitization {
                        construct: format!("`{func}` applied to {} arguments", args.len()),
                    });
                };
                self.out.push(Token::Function(name));
                self.out.push(Token::LParen);
                self.emit(arg)?;
                self.out.push(Token::RParen);
                Ok(())
            }
            ExprNode::Derivative(inner) => {
                let name = self.derivative_name(inner).ok_or_else(|| ExportError::Sanitization {
                    construct: format!("time derivative `{expr}`"),
                })?;
                self.out.push(Token::Name(name));
                Ok(())
            }
        }
    }

    /// `D(q) -> qdot`, `D(qdot) -> qddot`, `D(D(q)) -> qddot`.
    fn derivative_name(&self, inner: &Expr) -> Option<String> {
        let symbol = match inner.node() {
            ExprNode::Symbol(s) => s,
            ExprNode::Derivative(innermost) => {
                let s = innermost.as_symbol()?;
                let SymbolRole::Position(i) = s.role() else {
                    return None;
                };
                let coord = self.registry.coordinate(i)?;
                return Some(self.exporter.exported_name(coord.acceleration()));
            }
            _ => return None,
        };
        let coord = self.registry.coordinate_of(symbol)?;
        let target = match symbol.role() {
            SymbolRole::Position(_) => coord.velocity(),
            SymbolRole::Velocity(_) => coord.acceleration(),
            _ => return None,
        };
        Some(self.exporter.exported_name(target))
    }

    fn number(&mut self, n: &Rational) {
        if n.is_integer() {
            self.out.push(Token::Number(n.numerator().to_string()));
        } else {
            self.out.push(Token::Number(n.numerator().to_string()));
            self.out.push(Token::Slash);
            self.out.push(Token::Number(n.denominator().to_string()));
        }
    }

    /// Writes `[-] numerator [/ denominator]`.
    fn product(&mut self, factors: &[Expr]) -> Result<()> {
        let mut coefficient = None;
        let mut numerator = Vec::new();
        let mut denominator = Vec::new();
        for factor in factors {
            match factor.node() {
                ExprNode::Number(n) => coefficient = Some(n.clone()),
                ExprNode::Pow { base, exp } => match exp.as_number() {
                    Some(e) if e.is_negative() => {
                        denominator.push(Expr::pow(base.clone(), Expr::number(e.abs())));
                    }
                    _ => numerator.push(factor.clone()),
                },
                _ => numerator.push(factor.clone()),
            }
        }

        if let Some(c) = &coefficient {
            if c.is_negative() {
                self.out.push(Token::Neg);
            }
            let magnitude = c.abs();
            let num = Rational::from(magnitude.numerator());
            if numerator.is_empty() || !num.is_one() {
                numerator.insert(0, Expr::number(num));
            }
            let den = Rational::from(magnitude.denominator());
            if !den.is_one() {
                denominator.insert(0, Expr::number(den));
            }
        }
        if numerator.is_empty() {
            numerator.push(Expr::one());
        }

        for (i, factor) in numerator.iter().enumerate() {
            if i > 0 {
                self.out.push(Token::Star);
            }
            self.emit_prec(factor, PREC_POW)?;
        }
        match denominator.as_slice() {
            [] => {}
            [single] => {
                self.out.push(Token::Slash);
                self.emit_prec(single, PREC_POW)?;
            }
            many => {
                self.out.push(Token::Slash);
                self.out.push(Token::LParen);
                for (i, factor) in many.iter().enumerate() {
                    if i > 0 {
                        self.out.push(Token::Star);
                    }
                    self.emit_prec(factor, PREC_POW)?;
                }
                self.out.push(Token::RParen);
            }
        }
        Ok(())
    }
}

fn leading_negative(expr: &Expr) -> bool {
    match expr.node() {
        ExprNode::Number(n) => n.is_negative(),
        ExprNode::Mul(factors) => factors
            .first()
            .and_then(Expr::as_number)
            .is_some_and(Rational::is_negative),
        _ => false,
    }
}

/// Binding strength of the exported form of `expr`.
fn precedence(expr: &Expr) -> u8 {
    match expr.node() {
        ExprNode::Number(n) => {
            if n.is_negative() {
                PREC_ADD
            } else if n.is_integer() {
                PREC_ATOM
            } else {
                PREC_MUL
            }
        }
        ExprNode::Symbol(_) | ExprNode::Function { .. } | ExprNode::Derivative(_) => PREC_ATOM,
        ExprNode::Add(_) => PREC_ADD,
        ExprNode::Mul(_) => {
            if leading_negative(expr) {
                PREC_ADD
            } else {
                PREC_MUL
            }
        }
        ExprNode::Pow { exp, .. } => match exp.as_number() {
            Some(e) if e.is_negative() => PREC_MUL,
            Some(e) if *e == Rational::from_i64(1, 2) => PREC_ATOM,
            _ => PREC_POW,
        },
    }
}
