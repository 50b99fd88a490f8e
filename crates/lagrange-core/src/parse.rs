//! Infix expression parser.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/") unary)*
//! unary   := ("-" | "+") unary | power
//! power   := primary (("^" | "**") unary)?
//! primary := number | name | name "(" expr ")" | "(" expr ")"
//! ```
//!
//! Powers are right associative and bind tighter than unary minus, so
//! `-x^2` is `-(x^2)` and `2^-1` is one half. `D(e)` is the time
//! derivative marker. Decimal literals are read exactly (`0.5` is `1/2`).

use num_traits::Zero;

use crate::error::{CoreError, Result};
use crate::expr::{Expr, Function};
use crate::number::Rational;
use crate::registry::SymbolRegistry;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Number(Rational),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
    End,
}

/// Parses `input`, resolving names against `registry`.
///
/// # Errors
///
/// Returns [`CoreError::Parse`] for malformed input and
/// [`CoreError::UnboundSymbol`] for names the registry does not know.
pub fn parse(input: &str, registry: &SymbolRegistry) -> Result<Expr> {
    parse_with(input, |name| registry.resolve(name).ok().map(Expr::symbol))
}

/// Parses `input` with a custom name resolver.
///
/// # Errors
///
/// Same as [`parse`].
pub fn parse_with<R>(input: &str, resolve: R) -> Result<Expr>
where
    R: Fn(&str) -> Option<Expr>,
{
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        resolve,
    };
    let expr = parser.expr()?;
    match parser.peek() {
        Token::End => Ok(expr),
        other => Err(parser.error(format!("unexpected {other:?}"))),
    }
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let token = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => Token::Plus,
            b'-' => Token::Minus,
            b'*' if bytes.get(i + 1) == Some(&b'*') => {
                i += 1;
                Token::Caret
            }
            b'*' => Token::Star,
            b'/' => Token::Slash,
            b'^' => Token::Caret,
            b'(' => Token::LParen,
            b')' => Token::RParen,
            b'0'..=b'9' | b'.' => {
                while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                    i += 1;
                }
                let literal = &input[start..i];
                let value = parse_decimal(literal).ok_or_else(|| CoreError::Parse {
                    position: start,
                    message: format!("invalid number `{literal}`"),
                })?;
                tokens.push((start, Token::Number(value)));
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push((start, Token::Name(input[start..i].to_string())));
                continue;
            }
            _ => {
                return Err(CoreError::Parse {
                    position: start,
                    message: format!(
                        "unexpected character `{}`",
                        input[start..].chars().next().unwrap_or('?')
                    ),
                })
            }
        };
        i += 1;
        tokens.push((start, token));
    }
    tokens.push((input.len(), Token::End));
    Ok(tokens)
}

/// Reads `123`, `1.25` or `.5` as an exact rational.
fn parse_decimal(literal: &str) -> Option<Rational> {
    let (whole, frac) = match literal.split_once('.') {
        Some((w, f)) => (w, f),
        None => (literal, ""),
    };
    if (whole.is_empty() && frac.is_empty()) || frac.contains('.') {
        return None;
    }
    let ten = Rational::from(10_i64);
    let mut value = Rational::zero();
    for d in whole.bytes().chain(frac.bytes()) {
        value = value * ten.clone() + Rational::from(i64::from(d - b'0'));
    }
    let scale = ten.powi(i64::try_from(frac.len()).ok()?)?;
    Some(value / scale)
}

struct Parser<R> {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    resolve: R,
}

impl<R> Parser<R>
where
    R: Fn(&str) -> Option<Expr>,
{
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].1
    }

    fn position(&self) -> usize {
        self.tokens[self.pos.min(self.tokens.len() - 1)].0
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error(&self, message: String) -> CoreError {
        CoreError::Parse {
            position: self.position(),
            message,
        }
    }

    fn expect(&mut self, want: &Token) -> Result<()> {
        if self.peek() == want {
            self.bump();
            Ok(())
        } else {
            Err(self.error(format!("expected {want:?}, found {:?}", self.peek())))
        }
    }

    fn expr(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            match self.peek() {
                Token::Plus => {
                    self.bump();
                    lhs = lhs + self.term()?;
                }
                Token::Minus => {
                    self.bump();
                    lhs = lhs - self.term()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek() {
                Token::Star => {
                    self.bump();
                    lhs = lhs * self.unary()?;
                }
                Token::Slash => {
                    self.bump();
                    lhs = lhs / self.unary()?;
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Token::Minus => {
                self.bump();
                Ok(-self.unary()?)
            }
            Token::Plus => {
                self.bump();
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if self.peek() == &Token::Caret {
            self.bump();
            let exp = self.unary()?;
            return Ok(Expr::pow(base, exp));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        let position = self.position();
        match self.bump() {
            Token::Number(n) => Ok(Expr::number(n)),
            Token::LParen => {
                let inner = self.expr()?;
                self.expect(&Token::RParen)?;
                Ok(inner)
            }
            Token::Name(name) if self.peek() == &Token::LParen => {
                self.bump();
                let arg = self.expr()?;
                self.expect(&Token::RParen)?;
                match name.as_str() {
                    "D" => Ok(Expr::derivative(arg)),
                    "sqrt" => Ok(Expr::sqrt(arg)),
                    _ => Function::from_name(&name)
                        .map(|f| Expr::func(f, [arg]))
                        .ok_or(CoreError::Parse {
                            position,
                            message: format!("unknown function `{name}`"),
                        }),
                }
            }
            Token::Name(name) => {
                (self.resolve)(&name).ok_or(CoreError::UnboundSymbol { name })
            }
            other => Err(CoreError::Parse {
                position,
                message: format!("unexpected {other:?}"),
            }),
        }
    }
}
