//! Caller-supplied energies and generalized forces.
//!
//! [`EnergyInput`] accepts any expressions; only [`EnergyInput::validate`]
//! can produce the [`Energies`] the rest of the pipeline consumes, so no
//! differentiation ever runs on unchecked input.

use lagrange_core::{Expr, SymbolRegistry, SymbolRole};

use crate::assembler::time_rates;
use crate::error::{DerivationError, InputSlot, Result};

/// Unvalidated kinetic energy, potential energy and optional forces.
#[derive(Clone, Debug)]
pub struct EnergyInput {
    kinetic: Expr,
    potential: Expr,
    forces: Option<Vec<Expr>>,
}

impl EnergyInput {
    /// Pairs a kinetic and a potential energy.
    #[must_use]
    pub fn new(kinetic: Expr, potential: Expr) -> Self {
        Self {
            kinetic,
            potential,
            forces: None,
        }
    }

    /// External generalized forces, one per coordinate in declaration
    /// order. Without forces every `Q_i` is zero.
    #[must_use]
    pub fn with_forces(mut self, forces: Vec<Expr>) -> Self {
        self.forces = Some(forces);
        self
    }

    /// Checks every expression against `registry`.
    ///
    /// Time-derivative markers written by the caller are lowered to
    /// velocity symbols first.
    ///
    /// # Errors
    ///
    /// - [`DerivationError::UnboundSymbol`] for a symbol from another
    ///   session
    /// - [`DerivationError::EnergyDependsOnAcceleration`] for an
    ///   acceleration symbol
    /// - [`DerivationError::ForceCountMismatch`] if forces are given but not
    ///   one per coordinate
    pub fn validate(self, registry: &SymbolRegistry) -> Result<Energies> {
        let n = registry.coordinates().len();
        let forces = match self.forces {
            Some(forces) if forces.len() != n => {
                return Err(DerivationError::ForceCountMismatch {
                    expected: n,
                    found: forces.len(),
                });
            }
            Some(forces) => forces,
            None => vec![Expr::zero(); n],
        };

        let kinetic = check(registry, &self.kinetic, InputSlot::Kinetic)?;
        let potential = check(registry, &self.potential, InputSlot::Potential)?;
        let forces = forces
            .iter()
            .enumerate()
            .map(|(i, f)| check(registry, f, InputSlot::Force(i)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(coordinates = n, "energy input validated");
        Ok(Energies {
            kinetic,
            potential,
            forces,
        })
    }
}

/// Validated energies, ready for the Lagrangian builder.
#[derive(Clone, Debug)]
pub struct Energies {
    kinetic: Expr,
    potential: Expr,
    forces: Vec<Expr>,
}

impl Energies {
    /// Kinetic energy `T`.
    #[must_use]
    pub fn kinetic(&self) -> &Expr {
        &self.kinetic
    }

    /// Potential energy `V`.
    #[must_use]
    pub fn potential(&self) -> &Expr {
        &self.potential
    }

    /// One generalized force per coordinate.
    #[must_use]
    pub fn forces(&self) -> &[Expr] {
        &self.forces
    }
}

fn check(registry: &SymbolRegistry, expr: &Expr, input: InputSlot) -> Result<Expr> {
    if let Some(foreign) = expr.free_symbols().into_iter().find(|s| !registry.contains(s)) {
        return Err(DerivationError::UnboundSymbol {
            name: foreign.name().to_string(),
            input,
        });
    }

    let lowered = if expr.contains_derivative() {
        expr.expand_derivatives(&time_rates(registry))?
    } else {
        expr.clone()
    };

    let acceleration = lowered.free_symbols().into_iter().find_map(|s| match s.role() {
        SymbolRole::Acceleration(i) => registry.coordinate(i),
        _ => None,
    });
    if let Some(coordinate) = acceleration {
        return Err(DerivationError::EnergyDependsOnAcceleration {
            input,
            coordinate: coordinate.name().to_string(),
        });
    }
    Ok(lowered)
}
