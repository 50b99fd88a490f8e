//! Textual system definitions.
//!
//! A [`SystemDefinition`] is the input contract in serializable form:
//! coordinate and parameter names plus infix strings for the energies and
//! the optional generalized forces. Each derivation builds a fresh
//! registry, so definitions can be derived concurrently.

use lagrange_core::{parse, CoreError, NamingConvention, SymbolRegistry};
use lagrange_export::{ExportConfig, ExportError, ExportedExpression, Exporter};
use lagrange_mechanics::{Derivation, DerivationError, EnergyInput, Pipeline};
use lagrange_simplify::{Simplifier, SimplifierConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A mechanical system described by names and infix expressions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemDefinition {
    /// Optional label used in logs.
    #[serde(default)]
    pub name: Option<String>,
    /// Generalized coordinates in order.
    pub coordinates: Vec<String>,
    /// Constant parameters.
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Kinetic energy `T`.
    pub kinetic: String,
    /// Potential energy `V`.
    pub potential: String,
    /// One generalized force per coordinate.
    #[serde(default)]
    pub forces: Option<Vec<String>>,
}

/// Settings shared by every stage of a derivation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeriveOptions {
    /// Velocity and acceleration names.
    pub naming: NamingConvention,
    /// Simplifier limits.
    pub simplifier: SimplifierConfig,
    /// Output spelling.
    pub export: ExportConfig,
}

/// Errors from deriving a textual system.
#[derive(Debug, Error)]
pub enum SystemError {
    /// A coordinate or parameter could not be declared.
    #[error(transparent)]
    Declaration(#[from] CoreError),

    /// An energy or force string failed to parse.
    #[error("in {field}: {source}")]
    Parse {
        /// `kinetic`, `potential` or `forces[i]`.
        field: String,
        /// The parse or lookup failure.
        #[source]
        source: CoreError,
    },

    /// A pipeline stage failed.
    #[error(transparent)]
    Derivation(#[from] DerivationError),

    /// The solved accelerations could not be exported.
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result alias for system derivations.
pub type Result<T> = std::result::Result<T, SystemError>;

/// Ordered `(coordinate, acceleration)` pairs.
pub type ExportedAccelerations = Vec<(String, ExportedExpression)>;

impl SystemDefinition {
    /// Label for logs.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    /// Declares every coordinate, then every parameter, in a new session.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Declaration`] for invalid or clashing names.
    pub fn registry(&self, naming: &NamingConvention) -> Result<SymbolRegistry> {
        let mut registry = SymbolRegistry::with_naming(naming.clone());
        for name in &self.coordinates {
            registry.declare_coordinate(name)?;
        }
        for name in &self.parameters {
            registry.declare_parameter(name)?;
        }
        Ok(registry)
    }

    /// Parses the energies and forces against `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Parse`] naming the offending field.
    pub fn energy_input(&self, registry: &SymbolRegistry) -> Result<EnergyInput> {
        let read = |field: String, text: &str| {
            parse(text, registry).map_err(|source| SystemError::Parse { field, source })
        };
        let kinetic = read("kinetic".to_string(), &self.kinetic)?;
        let potential = read("potential".to_string(), &self.potential)?;
        let mut input = EnergyInput::new(kinetic, potential);
        if let Some(forces) = &self.forces {
            let forces = forces
                .iter()
                .enumerate()
                .map(|(i, f)| read(format!("forces[{i}]"), f))
                .collect::<Result<Vec<_>>>()?;
            input = input.with_forces(forces);
        }
        Ok(input)
    }

    /// Declares, parses and validates without deriving.
    ///
    /// # Errors
    ///
    /// Fails like [`derive`](Self::derive) would before assembly.
    pub fn check(&self, options: &DeriveOptions) -> Result<()> {
        let registry = self.registry(&options.naming)?;
        if registry.coordinates().is_empty() {
            return Err(DerivationError::NoCoordinates.into());
        }
        self.energy_input(&registry)?.validate(&registry)?;
        tracing::debug!(system = self.label(), "system definition checked");
        Ok(())
    }

    /// Derives the solved accelerations.
    ///
    /// # Errors
    ///
    /// Fails with the first declaration, parse or derivation error.
    #[tracing::instrument(skip_all, fields(system = self.label()))]
    pub fn derive(&self, options: &DeriveOptions) -> Result<DerivedSystem> {
        let registry = self.registry(&options.naming)?;
        let input = self.energy_input(&registry)?;
        let derivation = Pipeline::new(&registry)
            .with_simplifier(Simplifier::with_config(options.simplifier.clone()))
            .derive(input)?;
        Ok(DerivedSystem {
            registry,
            derivation,
        })
    }
}

/// A finished derivation together with the registry of its session.
#[derive(Debug)]
pub struct DerivedSystem {
    registry: SymbolRegistry,
    derivation: Derivation,
}

impl DerivedSystem {
    /// The registry the derivation was run against.
    #[must_use]
    pub fn registry(&self) -> &SymbolRegistry {
        &self.registry
    }

    /// The pipeline result.
    #[must_use]
    pub fn derivation(&self) -> &Derivation {
        &self.derivation
    }

    /// Exports every solved acceleration.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError::Export`]; the derivation stays available.
    pub fn export(&self, config: &ExportConfig) -> Result<ExportedAccelerations> {
        Ok(Exporter::with_config(config.clone()).export_derivation(&self.registry, &self.derivation)?)
    }
}

/// Derives and exports one system.
///
/// # Errors
///
/// Fails with the first error of any stage.
pub fn derive_system(
    definition: &SystemDefinition,
    options: &DeriveOptions,
) -> Result<ExportedAccelerations> {
    definition.derive(options)?.export(&options.export)
}

/// Derives and exports independent systems in parallel. Results keep the
/// order of `definitions`.
#[must_use]
pub fn derive_many(
    definitions: &[SystemDefinition],
    options: &DeriveOptions,
) -> Vec<Result<ExportedAccelerations>> {
    definitions
        .par_iter()
        .map(|definition| derive_system(definition, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oscillator() -> SystemDefinition {
        SystemDefinition {
            name: Some("oscillator".to_string()),
            coordinates: vec!["x".to_string()],
            parameters: vec!["m".to_string(), "k".to_string()],
            kinetic: "m*dx^2/2".to_string(),
            potential: "k*x^2/2".to_string(),
            forces: None,
        }
    }

    #[test]
    fn test_check_ok() {
        oscillator().check(&DeriveOptions::default()).unwrap();
    }

    #[test]
    fn test_parse_error_names_field() {
        let mut def = oscillator();
        def.potential = "k*x^".to_string();
        let err = def.check(&DeriveOptions::default()).unwrap_err();
        assert!(matches!(err, SystemError::Parse { ref field, .. } if field == "potential"));
    }

    #[test]
    fn test_unknown_name_in_force() {
        let mut def = oscillator();
        def.forces = Some(vec!["-c*dx".to_string()]);
        let err = def.check(&DeriveOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SystemError::Parse {
                ref field,
                source: CoreError::UnboundSymbol { .. }
            } if field == "forces[0]"
        ));
    }

    #[test]
    fn test_duplicate_declaration() {
        let mut def = oscillator();
        def.parameters.push("dx".to_string());
        assert!(matches!(
            def.check(&DeriveOptions::default()),
            Err(SystemError::Declaration(CoreError::DuplicateSymbol { .. }))
        ));
    }

    #[test]
    fn test_no_coordinates() {
        let mut def = oscillator();
        def.coordinates.clear();
        def.kinetic = "0".to_string();
        def.potential = "k".to_string();
        assert!(matches!(
            def.check(&DeriveOptions::default()),
            Err(SystemError::Derivation(DerivationError::NoCoordinates))
        ));
    }

    #[test]
    fn test_derive_oscillator() {
        let exported = derive_system(&oscillator(), &DeriveOptions::default()).unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].0, "x");
        let value = exported[0]
            .1
            .evaluate(|n| match n {
                "x" => Some(0.5),
                "k" => Some(4.0),
                "m" => Some(2.0),
                _ => None,
            })
            .unwrap();
        approx::assert_relative_eq!(value, -1.0);
    }
}
