//! Property-based tests for the simplifier.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::engine::{equivalent, Simplifier};
    use lagrange_core::{Expr, SymbolRegistry};

    // Leaves: three symbols and small integers
    fn leaf() -> impl Strategy<Value = Expr> {
        let mut reg = SymbolRegistry::new();
        let symbols: Vec<Expr> = ["x", "y", "z"]
            .iter()
            .map(|name| reg.declare_parameter(name).map(|p| p.expr()))
            .collect::<Result<_, _>>()
            .unwrap();
        prop_oneof![
            proptest::sample::select(symbols),
            (-3i64..=3).prop_map(Expr::integer),
        ]
    }

    // Random expressions built from + * integer powers sin cos
    fn expr() -> impl Strategy<Value = Expr> {
        leaf().prop_recursive(3, 16, 2, |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a + b),
                (inner.clone(), inner.clone()).prop_map(|(a, b)| a * b),
                (inner.clone(), prop_oneof![Just(-1i64), Just(2), Just(3)])
                    .prop_map(|(a, k)| Expr::powi(a, k)),
                inner.clone().prop_map(Expr::sin),
                inner.prop_map(Expr::cos),
            ]
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn simplify_idempotent(e in expr()) {
            let s = Simplifier::new();
            let once = s.simplify(&e);
            let twice = s.simplify(&once);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn simplify_preserves_meaning(e in expr()) {
            let once = Simplifier::new().simplify(&e);
            prop_assert!(equivalent(&once, &e));
        }

        #[test]
        fn difference_with_self_is_zero(e in expr()) {
            prop_assert!(Simplifier::new().is_zero(&(&e - &e)));
        }
    }
}
