//! # lagrange-linalg
//!
//! Dense linear algebra for small systems with exact entries.
//!
//! This crate provides:
//! - [`Ring`] and [`Field`] traits for matrix entries
//! - Dense matrices with Gauss-Jordan elimination
//! - [`Symbolic`], the field of simplified rational functions, so that a
//!   mass matrix can be inverted symbolically
//!
//! Pivots are chosen by exact zero tests. For symbolic entries this is the
//! canonical-form zero test of `lagrange-simplify`, so an entry that is
//! zero only up to a trigonometric identity is never used as a pivot.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod dense_matrix;
pub mod error;
pub mod symbolic;
pub mod traits;

pub use dense_matrix::DenseMatrix;
pub use error::SolveError;
pub use symbolic::Symbolic;
pub use traits::{Field, Ring};
