//! # lagrange-core
//!
//! Expression core of the Lagrange equations-of-motion toolkit.
//!
//! This crate provides:
//! - Exact rational constants backed by `dashu`
//! - Per-session symbol registries with coordinate/velocity/acceleration
//!   naming
//! - Immutable, thread-safe expression trees with a time-derivative marker
//! - Partial and total time differentiation
//! - Numeric evaluation and an infix parser
//!
//! ## Design Principles
//!
//! - **Identity over names**: symbols compare by `(session, index)`, so two
//!   derivation sessions never mix their symbols
//! - **Exactness**: every coefficient is a rational, floating point only
//!   appears in [`Expr::evaluate`]
//! - **Structural values**: `Expr` equality is tree equality; mathematical
//!   equality is decided by the simplifier

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod diff;
pub mod error;
pub mod eval;
pub mod expr;
pub mod number;
pub mod parse;
pub mod registry;
pub mod symbol;

pub use error::{CoreError, Result};
pub use expr::{Expr, ExprNode, Function};
pub use number::{Integer, Rational};
pub use parse::{parse, parse_with};
pub use registry::{Affix, GeneralizedCoordinate, NamingConvention, Parameter, SymbolRegistry};
pub use symbol::{Symbol, SymbolId, SymbolRole};
