//! Errors raised by the expression core.

use thiserror::Error;

/// Errors that can occur while declaring symbols or manipulating
/// expressions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A declaration reused a name, including a derived velocity or
    /// acceleration name.
    #[error("symbol `{name}` is already declared in this session")]
    DuplicateSymbol {
        /// The clashing name.
        name: String,
    },

    /// The name is not an identifier.
    #[error("invalid symbol name `{name}`")]
    InvalidSymbolName {
        /// The rejected name.
        name: String,
    },

    /// Lookup of an unknown name.
    #[error("no symbol named `{name}`")]
    NotFound {
        /// The requested name.
        name: String,
    },

    /// The symbol belongs to a different registry.
    #[error("symbol `{name}` is not declared in this session")]
    UnboundSymbol {
        /// Name of the foreign symbol.
        name: String,
    },

    /// No derivative rule for the function.
    #[error("function `{function}` has no derivative rule")]
    NonDifferentiable {
        /// Function name.
        function: String,
    },

    /// A `D(..)` marker reached an operation that needs it expanded.
    #[error("time-derivative marker must be expanded first")]
    UnexpandedDerivative,

    /// Numeric evaluation met a symbol without a value.
    #[error("no value bound for `{name}`")]
    MissingValue {
        /// Name of the unbound symbol.
        name: String,
    },

    /// Numeric evaluation met a function it cannot compute.
    #[error("function `{function}` cannot be evaluated numerically")]
    UnsupportedFunction {
        /// Function name.
        function: String,
    },

    /// Malformed expression text.
    #[error("parse error at byte {position}: {message}")]
    Parse {
        /// Byte offset of the offending token.
        position: usize,
        /// What was expected.
        message: String,
    },
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
