//! Euler–Lagrange assembly.
//!
//! For each coordinate `q_i`:
//!
//! ```text
//! E_i = d/dt(dL/dqdot_i) - dL/dq_i - Q_i
//! ```
//!
//! The total time derivative is written as a `Derivative` marker around
//! `dL/dqdot_i` and then expanded by the chain rule, which is where the
//! acceleration symbols enter.

use lagrange_core::{Expr, Symbol, SymbolRegistry};

use crate::error::Result;
use crate::lagrangian::Lagrangian;

/// One implicit equation `expr = 0` per coordinate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquationOfMotion {
    index: usize,
    coordinate: String,
    expr: Expr,
}

impl EquationOfMotion {
    /// Wraps `expr = 0` as the equation of coordinate `index`. Used by
    /// custom [`Assemble`] implementations.
    #[must_use]
    pub fn new(index: usize, coordinate: impl Into<String>, expr: Expr) -> Self {
        Self {
            index,
            coordinate: coordinate.into(),
            expr,
        }
    }

    /// Index of the coordinate the equation belongs to.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name of the coordinate this equation belongs to.
    #[must_use]
    pub fn coordinate(&self) -> &str {
        &self.coordinate
    }

    /// The left-hand side of `E_i = 0`.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

/// Produces the equations of motion from a Lagrangian.
pub trait Assemble {
    /// One equation per coordinate, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns a differentiation error if the Lagrangian or a force uses a
    /// function without a derivative rule.
    fn assemble(
        &self,
        registry: &SymbolRegistry,
        lagrangian: &Lagrangian,
        forces: &[Expr],
    ) -> Result<Vec<EquationOfMotion>>;
}

/// The Euler–Lagrange assembler.
#[derive(Clone, Copy, Debug, Default)]
pub struct EulerLagrange;

impl Assemble for EulerLagrange {
    fn assemble(
        &self,
        registry: &SymbolRegistry,
        lagrangian: &Lagrangian,
        forces: &[Expr],
    ) -> Result<Vec<EquationOfMotion>> {
        let rates = time_rates(registry);
        let l = lagrangian.expr();
        registry
            .coordinates()
            .iter()
            .map(|coord| {
                let i = coord.index();
                let momentum = l.diff(coord.velocity())?;
                let d_momentum = Expr::derivative(momentum).expand_derivatives(&rates)?;
                let generalized = l.diff(coord.position())?;
                let force = forces.get(i).cloned().unwrap_or_else(Expr::zero);
                let expr = Expr::add([d_momentum, -generalized, -force]);
                tracing::debug!(coordinate = coord.name(), nodes = expr.node_count(), "assembled equation");
                Ok(EquationOfMotion::new(i, coord.name(), expr))
            })
            .collect()
    }
}

/// Time rates of every time-dependent symbol: `q_j -> qdot_j` and
/// `qdot_j -> qddot_j`.
#[must_use]
pub fn time_rates(registry: &SymbolRegistry) -> Vec<(Symbol, Expr)> {
    registry
        .coordinates()
        .iter()
        .flat_map(|c| {
            [
                (c.position().clone(), c.qdot()),
                (c.velocity().clone(), c.qddot()),
            ]
        })
        .collect()
}

/// Total time derivative of `expr` in the session of `registry`.
///
/// # Errors
///
/// Propagates differentiation errors.
pub fn time_derivative(registry: &SymbolRegistry, expr: &Expr) -> Result<Expr> {
    let rates = time_rates(registry);
    Ok(expr.expand_derivatives(&rates)?.time_derivative(&rates)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyInput;
    use lagrange_core::parse;
    use lagrange_simplify::equivalent;

    #[test]
    fn test_harmonic_oscillator() {
        let mut reg = SymbolRegistry::new();
        reg.declare_coordinate("x").unwrap();
        reg.declare_parameter("m").unwrap();
        reg.declare_parameter("k").unwrap();
        let energies = EnergyInput::new(
            parse("m*dx^2/2", &reg).unwrap(),
            parse("k*x^2/2", &reg).unwrap(),
        )
        .validate(&reg)
        .unwrap();
        let eqs = EulerLagrange
            .assemble(&reg, &Lagrangian::build(&energies), energies.forces())
            .unwrap();
        assert_eq!(eqs.len(), 1);
        assert_eq!(eqs[0].coordinate(), "x");
        assert!(!eqs[0].expr().contains_derivative());
        assert!(equivalent(eqs[0].expr(), &parse("m*ddx + k*x", &reg).unwrap()));
    }

    #[test]
    fn test_force_is_subtracted() {
        let mut reg = SymbolRegistry::new();
        reg.declare_coordinate("x").unwrap();
        reg.declare_parameter("c").unwrap();
        let energies = EnergyInput::new(parse("dx^2/2", &reg).unwrap(), Expr::zero())
            .with_forces(vec![parse("-c*dx", &reg).unwrap()])
            .validate(&reg)
            .unwrap();
        let eqs = EulerLagrange
            .assemble(&reg, &Lagrangian::build(&energies), energies.forces())
            .unwrap();
        assert!(equivalent(eqs[0].expr(), &parse("ddx + c*dx", &reg).unwrap()));
    }

    #[test]
    fn test_time_derivative_chain_rule() {
        let mut reg = SymbolRegistry::new();
        reg.declare_coordinate("q").unwrap();
        reg.declare_parameter("l").unwrap();
        // d/dt (l sin q) = l cos(q) dq
        let d = time_derivative(&reg, &parse("l*sin(q)", &reg).unwrap()).unwrap();
        assert!(equivalent(&d, &parse("l*cos(q)*dq", &reg).unwrap()));
        // d/dt (dq^2) = 2 dq ddq
        let d = time_derivative(&reg, &parse("dq^2", &reg).unwrap()).unwrap();
        assert!(equivalent(&d, &parse("2*dq*ddq", &reg).unwrap()));
    }
}
