//! # lagrange-simplify
//!
//! Simplification by canonical forms.
//!
//! This crate provides:
//! - Sparse multivariate polynomials over opaque atoms
//! - Multivariate polynomial gcd
//! - Rational functions in lowest terms
//! - Trigonometric normalization modulo `sin^2 + cos^2 = 1`
//! - The [`Simplifier`] engine and a mathematical [`equivalent`] test
//! - Collection of affine forms for reading off linear systems
//!
//! ## Canonical Forms vs. Rewriting
//!
//! Every expression is mapped to a quotient of polynomials whose atoms are
//! themselves canonical. Zero is detected exactly, so `equivalent(a, b)`
//! never reports a false positive, and simplification is idempotent.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod canonical;
pub mod collect;
pub mod engine;
mod gcd;
pub mod poly;
pub mod rational_func;
pub mod trig;

#[cfg(test)]
mod proptests;

pub use collect::{CollectError, LinearForm};
pub use engine::{equivalent, simplify, SimplificationStats, Simplifier, SimplifierConfig};
pub use poly::{Monomial, Poly};
pub use rational_func::Frac;
