//! # Lagrange
//!
//! Closed-form equations of motion for mechanical systems, derived with
//! Lagrangian mechanics and exported as plain expressions for numeric
//! simulators.
//!
//! The pipeline runs once per system:
//!
//! ```text
//! registry -> energies -> L = T - V -> Euler-Lagrange -> M qddot = b
//!          -> simplify -> export
//! ```
//!
//! ## Features
//!
//! - **Exact arithmetic**: rational coefficients, no floating point until
//!   evaluation
//! - **Trigonometric canonical forms**: Pythagorean reduction and angle
//!   expansion, so equivalent results compare equal
//! - **Sessions**: every system owns its symbol registry; independent
//!   systems derive in parallel
//!
//! ## Quick Start
//!
//! ```
//! use lagrange::prelude::*;
//!
//! let pendulum = SystemDefinition {
//!     name: Some("pendulum".to_string()),
//!     coordinates: vec!["theta".to_string()],
//!     parameters: vec!["m".to_string(), "l".to_string(), "g".to_string()],
//!     kinetic: "m*l^2*dtheta^2/2".to_string(),
//!     potential: "-m*g*l*cos(theta)".to_string(),
//!     forces: None,
//! };
//! let accelerations = derive_system(&pendulum, &DeriveOptions::default()).unwrap();
//! assert_eq!(accelerations[0].0, "theta");
//! assert_eq!(accelerations[0].1.text(), "-g*sin(theta)/l");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use lagrange_core as core;
pub use lagrange_export as export;
pub use lagrange_linalg as linalg;
pub use lagrange_mechanics as mechanics;
pub use lagrange_simplify as simplify;

pub mod system;

pub use system::{
    derive_many, derive_system, DeriveOptions, DerivedSystem, ExportedAccelerations,
    SystemDefinition, SystemError,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::system::{
        derive_many, derive_system, DeriveOptions, DerivedSystem, SystemDefinition, SystemError,
    };
    pub use lagrange_core::{parse, Expr, NamingConvention, Symbol, SymbolRegistry};
    pub use lagrange_export::{ExportConfig, ExportedExpression, Exporter, PowerSyntax};
    pub use lagrange_mechanics::{Derivation, EnergyInput, Pipeline};
    pub use lagrange_simplify::{equivalent, simplify, Simplifier, SimplifierConfig};
}
