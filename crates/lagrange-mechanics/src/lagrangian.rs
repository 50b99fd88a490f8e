//! The Lagrangian `L = T - V`.

use lagrange_core::Expr;

use crate::energy::Energies;

/// The Lagrangian of a system. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lagrangian(Expr);

impl Lagrangian {
    /// `T - V` by structural subtraction.
    #[must_use]
    pub fn build(energies: &Energies) -> Self {
        let l = energies.kinetic() - energies.potential();
        tracing::debug!(nodes = l.node_count(), "lagrangian built");
        Self(l)
    }

    /// The expression `T - V`.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.0
    }

    /// Unwraps the expression.
    #[must_use]
    pub fn into_expr(self) -> Expr {
        self.0
    }
}
