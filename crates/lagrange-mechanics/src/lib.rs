//! # lagrange-mechanics
//!
//! Equations of motion by Lagrangian mechanics.
//!
//! This crate provides:
//! - Validation of caller-supplied energies and generalized forces
//! - The Lagrangian `L = T - V`
//! - Euler–Lagrange assembly behind the [`Assemble`] trait
//! - Symbolic solving of `M(q) qddot = b(q, qdot)` for the accelerations
//! - A per-session [`Pipeline`] that runs the stages in order
//!
//! ## Example
//!
//! ```
//! use lagrange_core::{parse, SymbolRegistry};
//! use lagrange_mechanics::{EnergyInput, Pipeline};
//!
//! let mut registry = SymbolRegistry::new();
//! registry.declare_coordinate("theta").unwrap();
//! for name in ["m", "l", "g"] {
//!     registry.declare_parameter(name).unwrap();
//! }
//! let t = parse("m*l^2*dtheta^2/2", &registry).unwrap();
//! let v = parse("-m*g*l*cos(theta)", &registry).unwrap();
//!
//! let derivation = Pipeline::new(&registry).derive(EnergyInput::new(t, v)).unwrap();
//! let expected = parse("-g/l*sin(theta)", &registry).unwrap();
//! assert!(lagrange_simplify::equivalent(derivation.accelerations()[0].expr(), &expected));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assembler;
pub mod energy;
pub mod error;
pub mod lagrangian;
pub mod pipeline;
pub mod solver;

pub use assembler::{time_derivative, time_rates, Assemble, EquationOfMotion, EulerLagrange};
pub use energy::{Energies, EnergyInput};
pub use error::{DerivationError, InputSlot, Result};
pub use lagrangian::Lagrangian;
pub use pipeline::{Derivation, Pipeline};
pub use solver::{AccelerationSolver, Solution, SolvedAcceleration};
