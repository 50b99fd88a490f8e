//! Solving the equations of motion for the accelerations.
//!
//! Each `E_i` is affine in the accelerations, so the system reads
//! `M(q) qddot + r(q, qdot) = 0`. The coefficients are collected from the
//! canonical form of each equation, and `M qddot = -r` is solved by
//! Gauss-Jordan elimination over symbolic rational functions.

use lagrange_core::{Expr, Symbol, SymbolRegistry};
use lagrange_linalg::{DenseMatrix, SolveError, Symbolic};
use lagrange_simplify::{CollectError, Simplifier};
use rayon::prelude::*;

use crate::assembler::EquationOfMotion;
use crate::error::{DerivationError, Result};

/// An explicit, simplified acceleration free of every acceleration symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SolvedAcceleration {
    index: usize,
    coordinate: String,
    expr: Expr,
}

impl SolvedAcceleration {
    /// Position of the coordinate in declaration order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name of the coordinate.
    #[must_use]
    pub fn coordinate(&self) -> &str {
        &self.coordinate
    }

    /// The acceleration expression.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// The linear system and its solution.
#[derive(Clone, Debug)]
pub struct Solution {
    mass_matrix: DenseMatrix<Symbolic>,
    rhs: Vec<Symbolic>,
    accelerations: Vec<SolvedAcceleration>,
}

impl Solution {
    /// The mass matrix `M`.
    #[must_use]
    pub fn mass_matrix(&self) -> &DenseMatrix<Symbolic> {
        &self.mass_matrix
    }

    /// The right-hand side `b = -r`.
    #[must_use]
    pub fn rhs(&self) -> &[Symbolic] {
        &self.rhs
    }

    /// One solved acceleration per coordinate.
    #[must_use]
    pub fn accelerations(&self) -> &[SolvedAcceleration] {
        &self.accelerations
    }

    /// Unwraps the accelerations.
    #[must_use]
    pub fn into_accelerations(self) -> Vec<SolvedAcceleration> {
        self.accelerations
    }
}

/// Extracts `M` and `b` and solves for the accelerations.
#[derive(Clone, Debug, Default)]
pub struct AccelerationSolver {
    simplifier: Simplifier,
}

impl AccelerationSolver {
    /// A solver with the default simplifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A solver with `simplifier`.
    #[must_use]
    pub fn with_simplifier(simplifier: Simplifier) -> Self {
        Self { simplifier }
    }

    /// The simplifier applied to each solution.
    #[must_use]
    pub fn simplifier(&self) -> &Simplifier {
        &self.simplifier
    }

    /// Solves `equations` for the accelerations of `registry`.
    ///
    /// # Errors
    ///
    /// - [`DerivationError::NonAffineEquation`] if an equation is not
    ///   affine in the accelerations
    /// - [`DerivationError::SingularMassMatrix`] if `M` is not invertible
    /// - [`DerivationError::AccelerationNotEliminated`] if a solution still
    ///   references an acceleration
    pub fn solve(
        &self,
        registry: &SymbolRegistry,
        equations: &[EquationOfMotion],
    ) -> Result<Solution> {
        let accelerations: Vec<Symbol> = registry.accelerations().cloned().collect();
        if equations.len() != accelerations.len() {
            return Err(SolveError::DimensionMismatch {
                expected: accelerations.len(),
                found: equations.len(),
            }
            .into());
        }

        let forms = equations
            .par_iter()
            .map(|eq| {
                self.simplifier
                    .collect_linear(eq.expr(), &accelerations)
                    .map_err(|CollectError::NonAffine { symbol }| {
                        DerivationError::NonAffineEquation {
                            equation: eq.index(),
                            symbol,
                        }
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<Vec<Symbolic>> = Vec::with_capacity(forms.len());
        let mut rhs = Vec::with_capacity(forms.len());
        for form in forms {
            rhs.push(Symbolic::new(form.constant.neg()));
            rows.push(form.coefficients.into_iter().map(Symbolic::new).collect());
        }
        let mass_matrix = DenseMatrix::from_rows(rows)?;
        tracing::debug!(size = mass_matrix.num_rows(), "mass matrix collected");

        let solved = mass_matrix.solve(&rhs).map_err(|e| match e {
            SolveError::Singular { column } => DerivationError::SingularMassMatrix {
                column,
                coordinate: registry
                    .coordinate(column)
                    .map(|c| c.name().to_string())
                    .unwrap_or_default(),
            },
            other => other.into(),
        })?;

        let accelerations = solved
            .par_iter()
            .zip(registry.coordinates().par_iter())
            .map(|(value, coord)| {
                let (expr, stats) = self
                    .simplifier
                    .simplify_with_stats(&value.to_expr(&self.simplifier));
                tracing::debug!(
                    coordinate = coord.name(),
                    input_nodes = stats.input_nodes,
                    output_nodes = stats.output_nodes,
                    numerator_terms = stats.numerator_terms,
                    denominator_terms = stats.denominator_terms,
                    "acceleration simplified"
                );
                if expr.any(|e| e.as_symbol().is_some_and(Symbol::is_acceleration)) {
                    return Err(DerivationError::AccelerationNotEliminated {
                        coordinate: coord.name().to_string(),
                    });
                }
                Ok(SolvedAcceleration {
                    index: coord.index(),
                    coordinate: coord.name().to_string(),
                    expr,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(count = accelerations.len(), "accelerations solved");

        Ok(Solution {
            mass_matrix,
            rhs,
            accelerations,
        })
    }
}
