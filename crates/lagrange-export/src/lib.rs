//! # lagrange-export
//!
//! Sanitized export of derived equations of motion.
//!
//! This crate provides:
//! - An [`Exporter`] that rewrites expressions into plain names, numbers,
//!   operators and elementary functions
//! - A token list as the exported form, with its text rendering
//! - Configurable power syntax, log spelling and symbol renames
//! - Numeric evaluation of exported expressions for round-trip checks
//!
//! ## Example
//!
//! ```
//! use lagrange_core::{parse, SymbolRegistry};
//! use lagrange_export::Exporter;
//!
//! let mut registry = SymbolRegistry::new();
//! registry.declare_coordinate("theta").unwrap();
//! registry.declare_parameter("g").unwrap();
//! registry.declare_parameter("l").unwrap();
//!
//! let e = parse("-(g/l)*sin(theta)", &registry).unwrap();
//! let exported = Exporter::new().export(&registry, &e).unwrap();
//! assert_eq!(exported.text(), "-g*sin(theta)/l");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod exporter;
pub mod token;

pub use config::{ExportConfig, PowerSyntax};
pub use error::{ExportError, Result};
pub use exporter::Exporter;
pub use token::{ExportedExpression, Token};
