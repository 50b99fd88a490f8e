//! Errors raised while deriving equations of motion.

use std::fmt;

use lagrange_core::CoreError;
use lagrange_linalg::SolveError;
use thiserror::Error;

/// Which caller-supplied expression an input error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputSlot {
    /// The kinetic energy `T`.
    Kinetic,
    /// The potential energy `V`.
    Potential,
    /// The external generalized force of the coordinate with this index.
    Force(usize),
}

impl fmt::Display for InputSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSlot::Kinetic => f.write_str("kinetic energy"),
            InputSlot::Potential => f.write_str("potential energy"),
            InputSlot::Force(i) => write!(f, "force on coordinate {i}"),
        }
    }
}

/// Errors from the derivation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    /// Registry or expression error (duplicate names, differentiation).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// An input references a symbol this session never declared.
    #[error("{input} references undeclared symbol `{name}`")]
    UnboundSymbol {
        /// Name of the foreign symbol.
        name: String,
        /// Where it was found.
        input: InputSlot,
    },

    /// An input references an acceleration symbol.
    #[error("{input} depends on the acceleration of `{coordinate}`")]
    EnergyDependsOnAcceleration {
        /// Where the acceleration was found.
        input: InputSlot,
        /// The coordinate whose acceleration it is.
        coordinate: String,
    },

    /// The number of forces differs from the number of coordinates.
    #[error("expected {expected} generalized forces, found {found}")]
    ForceCountMismatch {
        /// Number of coordinates.
        expected: usize,
        /// Number of forces supplied.
        found: usize,
    },

    /// The registry declares no coordinates.
    #[error("no generalized coordinates declared")]
    NoCoordinates,

    /// An equation is not affine in the accelerations.
    #[error("equation {equation} is not affine in `{symbol}`")]
    NonAffineEquation {
        /// Index of the equation (and coordinate).
        equation: usize,
        /// The acceleration symbol.
        symbol: String,
    },

    /// The mass matrix has no pivot in a column.
    #[error("mass matrix is singular: acceleration of `{coordinate}` (column {column}) is undetermined")]
    SingularMassMatrix {
        /// The column without a pivot.
        column: usize,
        /// The coordinate of that column.
        coordinate: String,
    },

    /// A solved acceleration still references an acceleration symbol.
    #[error("solution for `{coordinate}` still contains an acceleration")]
    AccelerationNotEliminated {
        /// The coordinate whose solution is invalid.
        coordinate: String,
    },

    /// Other linear algebra failure.
    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Result alias for derivation operations.
pub type Result<T> = std::result::Result<T, DerivationError>;
