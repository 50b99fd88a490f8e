//! The derivation pipeline of one session.
//!
//! A [`Pipeline`] borrows the registry of its session and runs energy
//! validation, Lagrangian construction, assembly and the acceleration solve
//! in that order. Nothing is shared between pipelines of different
//! registries.

use lagrange_core::SymbolRegistry;
use lagrange_linalg::{DenseMatrix, Symbolic};
use lagrange_simplify::Simplifier;

use crate::assembler::{Assemble, EquationOfMotion, EulerLagrange};
use crate::energy::EnergyInput;
use crate::error::{DerivationError, Result};
use crate::lagrangian::Lagrangian;
use crate::solver::{AccelerationSolver, Solution, SolvedAcceleration};

/// Stateless derivation pipeline bound to one registry.
#[derive(Clone, Debug)]
pub struct Pipeline<'r, A = EulerLagrange> {
    registry: &'r SymbolRegistry,
    assembler: A,
    solver: AccelerationSolver,
}

impl<'r> Pipeline<'r> {
    /// A pipeline using the Euler–Lagrange assembler and the default
    /// simplifier.
    #[must_use]
    pub fn new(registry: &'r SymbolRegistry) -> Self {
        Self {
            registry,
            assembler: EulerLagrange,
            solver: AccelerationSolver::new(),
        }
    }
}

impl<'r, A: Assemble> Pipeline<'r, A> {
    /// Replaces the assembler.
    #[must_use]
    pub fn with_assembler<B: Assemble>(self, assembler: B) -> Pipeline<'r, B> {
        Pipeline {
            registry: self.registry,
            assembler,
            solver: self.solver,
        }
    }

    /// Replaces the simplifier used by the solver.
    #[must_use]
    pub fn with_simplifier(mut self, simplifier: Simplifier) -> Self {
        self.solver = AccelerationSolver::with_simplifier(simplifier);
        self
    }

    /// The registry the system was declared in.
    #[must_use]
    pub fn registry(&self) -> &'r SymbolRegistry {
        self.registry
    }

    /// The simplifier used by every stage.
    #[must_use]
    pub fn simplifier(&self) -> &Simplifier {
        self.solver.simplifier()
    }

    /// Derives the equations of motion and solves for the accelerations.
    ///
    /// # Errors
    ///
    /// Fails with the first error of any stage. Input errors are reported
    /// before the assembler runs.
    #[tracing::instrument(skip_all, fields(session = self.registry.session()))]
    pub fn derive(&self, input: EnergyInput) -> Result<Derivation> {
        if self.registry.coordinates().is_empty() {
            return Err(DerivationError::NoCoordinates);
        }
        let energies = input.validate(self.registry)?;
        let lagrangian = Lagrangian::build(&energies);
        let equations = self
            .assembler
            .assemble(self.registry, &lagrangian, energies.forces())?;
        let solution = self.solver.solve(self.registry, &equations)?;
        tracing::info!(
            coordinates = equations.len(),
            "equations of motion derived"
        );
        Ok(Derivation {
            lagrangian,
            equations,
            solution,
        })
    }
}

/// Everything produced by one derivation.
#[derive(Clone, Debug)]
pub struct Derivation {
    lagrangian: Lagrangian,
    equations: Vec<EquationOfMotion>,
    solution: Solution,
}

impl Derivation {
    /// The Lagrangian of the system.
    #[must_use]
    pub fn lagrangian(&self) -> &Lagrangian {
        &self.lagrangian
    }

    /// The implicit equations, one per coordinate.
    #[must_use]
    pub fn equations(&self) -> &[EquationOfMotion] {
        &self.equations
    }

    /// The mass matrix `M`.
    #[must_use]
    pub fn mass_matrix(&self) -> &DenseMatrix<Symbolic> {
        self.solution.mass_matrix()
    }

    /// The solved accelerations together with `M` and `b`.
    #[must_use]
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Solved accelerations in coordinate order.
    #[must_use]
    pub fn accelerations(&self) -> &[SolvedAcceleration] {
        self.solution.accelerations()
    }
}
