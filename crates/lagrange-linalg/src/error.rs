//! Errors raised by matrix construction and solving.

use thiserror::Error;

/// Errors from linear solves.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    /// No non-zero pivot exists in the column.
    #[error("matrix is singular: no pivot in column {column}")]
    Singular {
        /// The column without a pivot.
        column: usize,
    },

    /// A row or vector has the wrong length.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// The operation needs a square matrix.
    #[error("matrix is not square: {rows}x{cols}")]
    NotSquare {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },
}
