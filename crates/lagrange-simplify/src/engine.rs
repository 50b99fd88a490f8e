//! The main simplification engine.
//!
//! Simplification converts an expression to its canonical rational form
//! and renders it back. The procedure is deterministic and idempotent:
//! `simplify(simplify(e)) == simplify(e)` structurally.

use lagrange_core::Expr;
use serde::{Deserialize, Serialize};

use crate::canonical::Canonicalizer;
use crate::rational_func::Frac;

/// Configuration for the simplification engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifierConfig {
    /// Largest integer power of a sum that is multiplied out. Higher
    /// powers keep the sum as a factor.
    pub expand_limit: u32,
    /// Largest integer multiple `n` for which `sin(n x)` and `cos(n x)` are
    /// expanded in terms of `sin(x)` and `cos(x)`.
    pub multiple_angle_limit: u32,
    /// Expand `sin`, `cos` and `tan` of sums and multiples.
    pub trig: bool,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            expand_limit: 8,
            multiple_angle_limit: 8,
            trig: true,
        }
    }
}

/// The main simplification engine.
#[derive(Clone, Debug, Default)]
pub struct Simplifier {
    /// Configuration.
    config: SimplifierConfig,
}

impl Simplifier {
    /// Creates a new simplifier with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simplifier with custom configuration.
    #[must_use]
    pub fn with_config(config: SimplifierConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SimplifierConfig {
        &self.config
    }

    /// Canonical rational form of `expr`.
    #[must_use]
    pub fn canonical(&self, expr: &Expr) -> Frac {
        Canonicalizer::new(&self.config).to_frac(expr)
    }

    /// Renders a canonical form back into an expression.
    #[must_use]
    pub fn render(&self, frac: &Frac) -> Expr {
        Canonicalizer::new(&self.config).render(frac)
    }

    /// Simplifies an expression.
    #[must_use]
    pub fn simplify(&self, expr: &Expr) -> Expr {
        self.render(&self.canonical(expr))
    }

    /// Simplifies and returns both the result and statistics.
    #[must_use]
    pub fn simplify_with_stats(&self, expr: &Expr) -> (Expr, SimplificationStats) {
        let frac = self.canonical(expr);
        let out = self.render(&frac);
        let stats = SimplificationStats {
            input_nodes: expr.node_count(),
            output_nodes: out.node_count(),
            numerator_terms: frac.numerator().len(),
            denominator_terms: frac.denominator().len(),
        };
        tracing::trace!(
            input_nodes = stats.input_nodes,
            output_nodes = stats.output_nodes,
            "simplified"
        );
        (out, stats)
    }

    /// Returns true if `expr` is identically zero.
    #[must_use]
    pub fn is_zero(&self, expr: &Expr) -> bool {
        self.canonical(expr).is_zero()
    }

    /// Returns true if `a - b` simplifies to zero.
    #[must_use]
    pub fn equivalent(&self, a: &Expr, b: &Expr) -> bool {
        self.is_zero(&(a - b))
    }
}

/// Statistics about one simplification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimplificationStats {
    /// Nodes in the input tree.
    pub input_nodes: usize,
    /// Nodes in the output tree.
    pub output_nodes: usize,
    /// Terms in the canonical numerator.
    pub numerator_terms: usize,
    /// Terms in the canonical denominator.
    pub denominator_terms: usize,
}

/// Simplifies with the default configuration.
#[must_use]
pub fn simplify(expr: &Expr) -> Expr {
    Simplifier::new().simplify(expr)
}

/// Mathematical equality test with the default configuration.
#[must_use]
pub fn equivalent(a: &Expr, b: &Expr) -> bool {
    Simplifier::new().equivalent(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagrange_core::{parse, SymbolRegistry};

    fn registry() -> SymbolRegistry {
        let mut reg = SymbolRegistry::new();
        reg.declare_coordinate("theta").unwrap();
        for name in ["m", "l", "g"] {
            reg.declare_parameter(name).unwrap();
        }
        reg
    }

    #[test]
    fn test_simplify_basic() {
        let reg = registry();
        let simplifier = Simplifier::new();

        // m + 0 = m
        let e = parse("m + 0", &reg).unwrap();
        assert_eq!(simplifier.simplify(&e).to_string(), "m");

        // 2/4 * m * 2 = m
        let e = parse("2/4*m*2", &reg).unwrap();
        assert_eq!(simplifier.simplify(&e).to_string(), "m");

        // m * 0 = 0
        let e = parse("m * 0 + l - l", &reg).unwrap();
        assert_eq!(simplifier.simplify(&e), Expr::zero());
    }

    #[test]
    fn test_simplify_pendulum_form() {
        let reg = registry();
        // (-m g l sin(theta)) / (m l^2) = -(g/l) sin(theta)
        let e = parse("(-m*g*l*sin(theta))/(m*l^2)", &reg).unwrap();
        let out = simplify(&e);
        assert_eq!(out.to_string(), "-g*sin(theta)*l^(-1)");
        assert!(equivalent(&out, &parse("-g/l*sin(theta)", &reg).unwrap()));
    }

    #[test]
    fn test_simplify_trig() {
        let reg = registry();
        // sin²(x) + cos²(x) = 1
        let e = parse("sin(theta)^2 + cos(theta)^2", &reg).unwrap();
        assert_eq!(simplify(&e), Expr::one());
    }

    #[test]
    fn test_idempotent_on_rational_function() {
        let reg = registry();
        let e = parse("(m + l)/(g*l - m) + sin(2*theta)/(m*l)", &reg).unwrap();
        let once = simplify(&e);
        assert_eq!(simplify(&once), once);
    }

    #[test]
    fn test_cancels_common_sum_factor() {
        let reg = registry();
        let e = parse("((m + l)*(m - 1))/((m + l)*(m + 1))", &reg).unwrap();
        assert_eq!(simplify(&e), simplify(&parse("(m - 1)/(m + 1)", &reg).unwrap()));
        let e = parse("(m^2 - 1)/(m^2 + 2*m + 1)", &reg).unwrap();
        let out = simplify(&e);
        assert_eq!(out, simplify(&parse("(m - 1)/(m + 1)", &reg).unwrap()));
        assert_eq!(simplify(&out), out);
    }

    #[test]
    fn test_huge_powers_do_not_overflow() {
        let reg = registry();
        let e = parse("(m^70000*l)^70000", &reg).unwrap();
        let out = simplify(&e);
        assert_eq!(simplify(&out), out);
        assert!(equivalent(&e, &out));
        let e = parse("2^1000000000000 * m", &reg).unwrap();
        assert_eq!(simplify(&simplify(&e)), simplify(&e));
    }

    #[test]
    fn test_stats() {
        let reg = registry();
        let e = parse("m*l + m*l + 0*g", &reg).unwrap();
        let (out, stats) = Simplifier::new().simplify_with_stats(&e);
        assert_eq!(out.to_string(), "2*m*l");
        assert_eq!(stats.output_nodes, 4);
        assert!(stats.input_nodes > stats.output_nodes);
        assert_eq!(stats.denominator_terms, 1);
    }

    #[test]
    fn test_trig_disabled_keeps_sums() {
        let reg = registry();
        let simplifier = Simplifier::with_config(SimplifierConfig {
            trig: false,
            ..SimplifierConfig::default()
        });
        let e = parse("sin(2*theta)", &reg).unwrap();
        assert_eq!(simplifier.simplify(&e).to_string(), "sin(2*theta)");
    }
}
