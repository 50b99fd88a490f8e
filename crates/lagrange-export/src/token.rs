//! Exported token streams.
//!
//! The token list is the exported form; the text is its concatenation. A
//! small recursive-descent reader evaluates the tokens back to `f64`, which
//! is how the round trip against the source expression is checked.
//!
//! Reader grammar, loosest binding first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := "-" unary | power
//! power   := primary ("^" unary)?
//! primary := number | name | function "(" expr ")" | "(" expr ")"
//! ```

use lagrange_core::eval::apply;
use lagrange_core::Function;
use serde::Serialize;

use crate::config::PowerSyntax;
use crate::error::{ExportError, Result};

/// One lexical element of an exported expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Token {
    /// A non-negative decimal integer.
    Number(String),
    /// A plain variable name.
    Name(String),
    /// A function name, always followed by `(`.
    Function(String),
    /// `+`
    Plus,
    /// Binary minus.
    Minus,
    /// Unary minus.
    Neg,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// The power operator, `^` or `**` depending on the configuration.
    Power,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl Token {
    /// The text of the token.
    #[must_use]
    pub fn text(&self, power: PowerSyntax) -> &str {
        match self {
            Token::Number(s) | Token::Name(s) | Token::Function(s) => s,
            Token::Plus => " + ",
            Token::Minus => " - ",
            Token::Neg => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::Power => power.as_str(),
            Token::LParen => "(",
            Token::RParen => ")",
        }
    }
}

/// A sanitized expression: plain names, numbers, operators and elementary
/// functions only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExportedExpression {
    text: String,
    tokens: Vec<Token>,
    #[serde(skip)]
    log_name: String,
}

impl ExportedExpression {
    /// Checks parenthesis balance and renders the text.
    pub(crate) fn new(tokens: Vec<Token>, power: PowerSyntax, log_name: &str) -> Result<Self> {
        check_balance(&tokens)?;
        let text = tokens.iter().map(|t| t.text(power)).collect();
        Ok(Self {
            text,
            tokens,
            log_name: log_name.to_string(),
        })
    }

    /// The rendered text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The token stream.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Every variable name, in order of first appearance.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let Token::Name(name) = token {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Evaluates the exported form, reading variable values from
    /// `bindings`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::MissingValue`] for an unbound name and
    /// [`ExportError::Malformed`] if the tokens do not form an expression.
    pub fn evaluate<F>(&self, bindings: F) -> Result<f64>
    where
        F: Fn(&str) -> Option<f64>,
    {
        let mut reader = Reader {
            tokens: &self.tokens,
            pos: 0,
            bindings,
            log_name: &self.log_name,
        };
        let value = reader.expr()?;
        if reader.pos != self.tokens.len() {
            return Err(reader.malformed("trailing tokens"));
        }
        Ok(value)
    }
}

impl std::fmt::Display for ExportedExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

fn check_balance(tokens: &[Token]) -> Result<()> {
    let mut depth = 0usize;
    for (position, token) in tokens.iter().enumerate() {
        match token {
            Token::LParen => depth += 1,
            Token::RParen => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(ExportError::UnbalancedParentheses { position })?;
            }
            _ => {}
        }
    }
    if depth == 0 {
        Ok(())
    } else {
        Err(ExportError::UnbalancedParentheses {
            position: tokens.len(),
        })
    }
}

struct Reader<'a, F> {
    tokens: &'a [Token],
    pos: usize,
    bindings: F,
    log_name: &'a str,
}

impl<F> Reader<'_, F>
where
    F: Fn(&str) -> Option<f64>,
{
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    fn malformed(&self, message: impl Into<String>) -> ExportError {
        ExportError::Malformed {
            position: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        if self.peek() == Some(expected) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.malformed(format!("expected {expected:?}")))
        }
    }

    fn expr(&mut self) -> Result<f64> {
        let mut value = self.term()?;
        loop {
            match self.peek() {
                Some(Token::Plus) => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(Token::Minus) => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn term(&mut self) -> Result<f64> {
        let mut value = self.unary()?;
        loop {
            match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    value *= self.unary()?;
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    value /= self.unary()?;
                }
                _ => return Ok(value),
            }
        }
    }

    fn unary(&mut self) -> Result<f64> {
        if self.peek() == Some(&Token::Neg) {
            self.pos += 1;
            return Ok(-self.unary()?);
        }
        let base = self.primary()?;
        if self.peek() == Some(&Token::Power) {
            self.pos += 1;
            let exp = self.unary()?;
            return Ok(base.powf(exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<f64> {
        match self.next().cloned() {
            Some(Token::Number(digits)) => digits
                .parse::<f64>()
                .map_err(|_| self.malformed(format!("invalid number `{digits}`"))),
            Some(Token::Name(name)) => {
                (self.bindings)(&name).ok_or(ExportError::MissingValue { name })
            }
            Some(Token::Function(name)) => {
                self.expect(&Token::LParen)?;
                let arg = self.expr()?;
                self.expect(&Token::RParen)?;
                self.call(&name, arg)
            }
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(value)
            }
            Some(other) => Err(self.malformed(format!("unexpected {other:?}"))),
            None => Err(self.malformed("unexpected end")),
        }
    }

    fn call(&self, name: &str, arg: f64) -> Result<f64> {
        if name == "sqrt" {
            return Ok(arg.sqrt());
        }
        let func = if name == self.log_name {
            Some(Function::Log)
        } else {
            Function::from_name(name)
        };
        func.and_then(|f| apply(&f, arg).ok())
            .ok_or_else(|| self.malformed(format!("unknown function `{name}`")))
    }
}
