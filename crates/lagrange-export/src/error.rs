//! Export errors.

use thiserror::Error;

/// Errors raised while exporting or re-reading an exported expression.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The expression holds a construct with no textual rule. The
    /// derivation itself is unaffected.
    #[error("cannot export {construct}")]
    Sanitization {
        /// Description of the construct.
        construct: String,
    },

    /// A token stream closes a group it never opened, or leaves one open.
    #[error("unbalanced parentheses at token {position}")]
    UnbalancedParentheses {
        /// Index of the offending token.
        position: usize,
    },

    /// A token stream that does not form an expression.
    #[error("malformed token stream at token {position}: {message}")]
    Malformed {
        /// Index of the offending token.
        position: usize,
        /// What was expected.
        message: String,
    },

    /// Evaluation of an exported expression met an unbound name.
    #[error("no value bound for `{name}`")]
    MissingValue {
        /// The unbound name.
        name: String,
    },
}

/// Result alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;
