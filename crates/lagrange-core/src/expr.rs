//! Expression trees.
//!
//! An [`Expr`] is an immutable, reference-counted tree. Cloning is cheap and
//! expressions may be shared freely between threads. Equality, hashing and
//! ordering are structural: `x + y` and `y + x` are different trees. Use the
//! simplifier to decide mathematical equality.
//!
//! The constructors perform only local folding (numeric constants,
//! identities like `x^1` and `0 * x`, flattening of nested sums and
//! products). They never reorder operands.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;

use num_traits::{One, Zero};
use smallvec::SmallVec;

use crate::number::Rational;
use crate::symbol::Symbol;

/// Elementary functions known to the core.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Function {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Exponential.
    Exp,
    /// Natural logarithm.
    Log,
    /// Inverse sine.
    Asin,
    /// Inverse cosine.
    Acos,
    /// Inverse tangent.
    Atan,
    /// Hyperbolic sine.
    Sinh,
    /// Hyperbolic cosine.
    Cosh,
    /// Hyperbolic tangent.
    Tanh,
    /// An uninterpreted function. It cannot be differentiated, evaluated
    /// or exported.
    Other(Arc<str>),
}

impl Function {
    /// Looks up a built-in function by its textual name. `ln` is an alias
    /// for `log`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "exp" => Function::Exp,
            "log" | "ln" => Function::Log,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            _ => return None,
        })
    }

    /// The canonical textual name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Exp => "exp",
            Function::Log => "log",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Other(name) => name,
        }
    }

    /// Returns true for `sin`, `cos` and `tan`.
    #[must_use]
    pub fn is_trigonometric(&self) -> bool {
        matches!(self, Function::Sin | Function::Cos | Function::Tan)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A node of the expression tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExprNode {
    /// An exact rational constant.
    Number(Rational),

    /// A registry-issued symbol.
    Symbol(Symbol),

    /// Sum of expressions.
    ///
    /// Invariant: at least 2 terms, none of them a sum.
    Add(SmallVec<[Expr; 4]>),

    /// Product of expressions.
    ///
    /// Invariant: at least 2 factors, none of them a product.
    Mul(SmallVec<[Expr; 4]>),

    /// `base ^ exp`.
    Pow {
        /// The base.
        base: Expr,
        /// The exponent.
        exp: Expr,
    },

    /// Function application.
    Function {
        /// The function.
        func: Function,
        /// The arguments.
        args: SmallVec<[Expr; 2]>,
    },

    /// Total time derivative `d/dt` of the inner expression, not yet
    /// expanded by the chain rule.
    Derivative(Expr),
}

/// An immutable, shareable expression.
#[derive(Clone, Hash)]
pub struct Expr(Arc<ExprNode>);

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Expr {}

impl PartialOrd for Expr {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Expr {
    fn cmp(&self, other: &Self) -> Ordering {
        if Arc::ptr_eq(&self.0, &other.0) {
            Ordering::Equal
        } else {
            self.0.cmp(&other.0)
        }
    }
}

impl Expr {
    fn from_node(node: ExprNode) -> Self {
        Self(Arc::new(node))
    }

    /// The root node.
    #[must_use]
    pub fn node(&self) -> &ExprNode {
        &self.0
    }

    // === Atoms ===

    /// A rational constant.
    #[must_use]
    pub fn number(value: Rational) -> Self {
        Self::from_node(ExprNode::Number(value))
    }

    /// An integer constant.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::number(Rational::from(value))
    }

    /// `numerator / denominator` as an exact constant.
    ///
    /// # Panics
    ///
    /// Panics if the denominator is zero.
    #[must_use]
    pub fn rational(numerator: i64, denominator: i64) -> Self {
        Self::number(Rational::from_i64(numerator, denominator))
    }

    /// The constant 0.
    #[must_use]
    pub fn zero() -> Self {
        Self::number(Rational::zero())
    }

    /// The constant 1.
    #[must_use]
    pub fn one() -> Self {
        Self::number(Rational::one())
    }

    /// A symbol leaf.
    #[must_use]
    pub fn symbol(symbol: &Symbol) -> Self {
        Self::from_node(ExprNode::Symbol(symbol.clone()))
    }

    // === Compound constructors ===

    /// Builds a sum, flattening nested sums and folding numeric terms.
    pub fn add<I: IntoIterator<Item = Expr>>(terms: I) -> Self {
        let mut constant = Rational::zero();
        let mut rest: SmallVec<[Expr; 4]> = SmallVec::new();
        for term in terms {
            match term.node() {
                ExprNode::Number(n) => constant = &constant + n,
                ExprNode::Add(inner) => {
                    for t in inner {
                        match t.node() {
                            ExprNode::Number(n) => constant = &constant + n,
                            _ => rest.push(t.clone()),
                        }
                    }
                }
                _ => rest.push(term),
            }
        }
        if !constant.is_zero() {
            rest.insert(0, Self::number(constant));
        }
        match rest.len() {
            0 => Self::zero(),
            1 => rest.remove(0),
            _ => Self::from_node(ExprNode::Add(rest)),
        }
    }

    /// Builds a product, flattening nested products and folding numeric
    /// factors. A zero factor collapses the product to zero.
    pub fn mul<I: IntoIterator<Item = Expr>>(factors: I) -> Self {
        let mut constant = Rational::one();
        let mut rest: SmallVec<[Expr; 4]> = SmallVec::new();
        for factor in factors {
            match factor.node() {
                ExprNode::Number(n) => constant = &constant * n,
                ExprNode::Mul(inner) => {
                    for t in inner {
                        match t.node() {
                            ExprNode::Number(n) => constant = &constant * n,
                            _ => rest.push(t.clone()),
                        }
                    }
                }
                _ => rest.push(factor),
            }
        }
        if constant.is_zero() {
            return Self::zero();
        }
        if !constant.is_one() {
            rest.insert(0, Self::number(constant));
        }
        match rest.len() {
            0 => Self::one(),
            1 => rest.remove(0),
            _ => Self::from_node(ExprNode::Mul(rest)),
        }
    }

    /// Builds `base ^ exp`.
    ///
    /// Numeric powers with integer exponents are evaluated, except for a
    /// negative power of zero which is kept symbolic.
    #[must_use]
    pub fn pow(base: Expr, exp: Expr) -> Self {
        if let ExprNode::Number(e) = exp.node() {
            if e.is_zero() {
                return Self::one();
            }
            if e.is_one() {
                return base;
            }
            match base.node() {
                ExprNode::Number(b) => {
                    if b.is_one() {
                        return base;
                    }
                    if let Some(value) = e.to_i64().and_then(|k| b.powi(k)) {
                        return Self::number(value);
                    }
                }
                // (b^e1)^n = b^(e1*n) for integer n.
                ExprNode::Pow {
                    base: inner,
                    exp: inner_exp,
                } if e.is_integer() => {
                    if let ExprNode::Number(e1) = inner_exp.node() {
                        return Self::pow(inner.clone(), Self::number(e1 * e));
                    }
                }
                _ => {}
            }
        }
        Self::from_node(ExprNode::Pow { base, exp })
    }

    /// `base ^ k` for an integer `k`.
    #[must_use]
    pub fn powi(base: Expr, k: i64) -> Self {
        Self::pow(base, Self::integer(k))
    }

    /// `sqrt(x)`, represented as `x ^ (1/2)`.
    #[must_use]
    pub fn sqrt(arg: Expr) -> Self {
        Self::pow(arg, Self::rational(1, 2))
    }

    /// Applies a function, folding the values at zero that are exact.
    pub fn func<I: IntoIterator<Item = Expr>>(func: Function, args: I) -> Self {
        let args: SmallVec<[Expr; 2]> = args.into_iter().collect();
        if args.len() == 1 {
            if let ExprNode::Number(n) = args[0].node() {
                if n.is_zero() {
                    match func {
                        Function::Sin
                        | Function::Tan
                        | Function::Asin
                        | Function::Atan
                        | Function::Sinh
                        | Function::Tanh => return Self::zero(),
                        Function::Cos | Function::Cosh | Function::Exp => return Self::one(),
                        _ => {}
                    }
                } else if n.is_one() && func == Function::Log {
                    return Self::zero();
                }
            }
        }
        Self::from_node(ExprNode::Function { func, args })
    }

    /// `sin(arg)`.
    #[must_use]
    pub fn sin(arg: Expr) -> Self {
        Self::func(Function::Sin, [arg])
    }

    /// `cos(arg)`.
    #[must_use]
    pub fn cos(arg: Expr) -> Self {
        Self::func(Function::Cos, [arg])
    }

    /// Wraps `inner` in a time-derivative marker. Constants have a zero
    /// time derivative and are folded immediately.
    #[must_use]
    pub fn derivative(inner: Expr) -> Self {
        if inner.is_number() {
            return Self::zero();
        }
        Self::from_node(ExprNode::Derivative(inner))
    }

    // === Queries ===

    /// The value of a numeric leaf.
    #[must_use]
    pub fn as_number(&self) -> Option<&Rational> {
        match self.node() {
            ExprNode::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The symbol of a symbol leaf.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self.node() {
            ExprNode::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true for a numeric leaf.
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self.node(), ExprNode::Number(_))
    }

    /// Returns true for the constant 0.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.as_number().is_some_and(Zero::is_zero)
    }

    /// Returns true for the constant 1.
    #[must_use]
    pub fn is_one(&self) -> bool {
        self.as_number().is_some_and(One::is_one)
    }

    /// Direct children in left-to-right order.
    #[must_use]
    pub fn children(&self) -> SmallVec<[&Expr; 4]> {
        match self.node() {
            ExprNode::Number(_) | ExprNode::Symbol(_) => SmallVec::new(),
            ExprNode::Add(args) | ExprNode::Mul(args) => args.iter().collect(),
            ExprNode::Pow { base, exp } => smallvec::smallvec![base, exp],
            ExprNode::Function { args, .. } => args.iter().collect(),
            ExprNode::Derivative(inner) => smallvec::smallvec![inner],
        }
    }

    /// Every symbol occurring in the expression, ordered by identity.
    #[must_use]
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut BTreeSet<Symbol>) {
        if let ExprNode::Symbol(s) = self.node() {
            out.insert(s.clone());
        }
        for child in self.children() {
            child.collect_symbols(out);
        }
    }

    /// Returns true if `symbol` occurs anywhere in the tree.
    #[must_use]
    pub fn contains_symbol(&self, symbol: &Symbol) -> bool {
        match self.node() {
            ExprNode::Symbol(s) => s == symbol,
            _ => self.children().iter().any(|c| c.contains_symbol(symbol)),
        }
    }

    /// Returns true if any node satisfies `pred`.
    pub fn any<F: Fn(&Expr) -> bool + Copy>(&self, pred: F) -> bool {
        pred(self) || self.children().iter().any(|c| c.any(pred))
    }

    /// Returns true if a time-derivative marker occurs anywhere.
    #[must_use]
    pub fn contains_derivative(&self) -> bool {
        self.any(|e| matches!(e.node(), ExprNode::Derivative(_)))
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Replaces every occurrence of `symbol` by `value`.
    #[must_use]
    pub fn substitute(&self, symbol: &Symbol, value: &Expr) -> Expr {
        if !self.contains_symbol(symbol) {
            return self.clone();
        }
        self.map_children(|c| c.substitute(symbol, value), || value.clone())
    }

    /// Rebuilds the node from transformed children. `on_symbol` is used
    /// when the node itself is a symbol.
    fn map_children<F, S>(&self, mut f: F, on_symbol: S) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
        S: FnOnce() -> Expr,
    {
        match self.node() {
            ExprNode::Number(_) => self.clone(),
            ExprNode::Symbol(_) => on_symbol(),
            ExprNode::Add(args) => Expr::add(args.iter().map(&mut f)),
            ExprNode::Mul(args) => Expr::mul(args.iter().map(&mut f)),
            ExprNode::Pow { base, exp } => Expr::pow(f(base), f(exp)),
            ExprNode::Function { func, args } => Expr::func(func.clone(), args.iter().map(&mut f)),
            ExprNode::Derivative(inner) => Expr::derivative(f(inner)),
        }
    }
}

impl From<Rational> for Expr {
    fn from(value: Rational) -> Self {
        Expr::number(value)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Expr::integer(value)
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Expr::symbol(symbol)
    }
}

// === Operators ===

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add([self, rhs])
    }
}

impl Add for &Expr {
    type Output = Expr;

    fn add(self, rhs: &Expr) -> Expr {
        Expr::add([self.clone(), rhs.clone()])
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::add([self, -rhs])
    }
}

impl Sub for &Expr {
    type Output = Expr;

    fn sub(self, rhs: &Expr) -> Expr {
        Expr::add([self.clone(), -rhs])
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul([self, rhs])
    }
}

impl Mul for &Expr {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        Expr::mul([self.clone(), rhs.clone()])
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::mul([self, Expr::powi(rhs, -1)])
    }
}

impl Div for &Expr {
    type Output = Expr;

    fn div(self, rhs: &Expr) -> Expr {
        Expr::mul([self.clone(), Expr::powi(rhs.clone(), -1)])
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::mul([Expr::integer(-1), self])
    }
}

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::mul([Expr::integer(-1), self.clone()])
    }
}

// === Display ===

const PREC_ADD: u8 = 1;
const PREC_MUL: u8 = 2;
const PREC_POW: u8 = 3;
const PREC_ATOM: u8 = 4;

impl Expr {
    fn precedence(&self) -> u8 {
        match self.node() {
            ExprNode::Number(n) => {
                if n.is_negative() {
                    PREC_ADD
                } else if n.is_integer() {
                    PREC_ATOM
                } else {
                    PREC_MUL
                }
            }
            ExprNode::Symbol(_) | ExprNode::Function { .. } | ExprNode::Derivative(_) => PREC_ATOM,
            ExprNode::Add(_) => PREC_ADD,
            ExprNode::Mul(_) => match self.leading_coefficient() {
                Some(c) if c.is_negative() => PREC_ADD,
                _ => PREC_MUL,
            },
            ExprNode::Pow { .. } => PREC_POW,
        }
    }

    fn leading_coefficient(&self) -> Option<&Rational> {
        match self.node() {
            ExprNode::Number(n) => Some(n),
            ExprNode::Mul(args) => args.first().and_then(Expr::as_number),
            _ => None,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, min_prec: u8) -> fmt::Result {
        if self.precedence() < min_prec {
            f.write_str("(")?;
            self.fmt_node(f)?;
            f.write_str(")")
        } else {
            self.fmt_node(f)
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            ExprNode::Number(n) => write!(f, "{n}"),
            ExprNode::Symbol(s) => write!(f, "{s}"),
            ExprNode::Add(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    let negative = term.leading_coefficient().is_some_and(Rational::is_negative);
                    if i == 0 {
                        term.fmt_prec(f, PREC_ADD)?;
                    } else if negative {
                        f.write_str(" - ")?;
                        (-term).fmt_prec(f, PREC_MUL)?;
                    } else {
                        f.write_str(" + ")?;
                        term.fmt_prec(f, PREC_ADD)?;
                    }
                }
                Ok(())
            }
            ExprNode::Mul(factors) => {
                let mut rest = &factors[..];
                if let Some(c) = factors.first().and_then(Expr::as_number) {
                    if c.is_negative() {
                        f.write_str("-")?;
                        let magnitude = c.abs();
                        if !magnitude.is_one() {
                            Expr::number(magnitude).fmt_prec(f, PREC_POW)?;
                            f.write_str("*")?;
                        }
                        rest = &factors[1..];
                    }
                }
                for (i, factor) in rest.iter().enumerate() {
                    if i > 0 {
                        f.write_str("*")?;
                    }
                    factor.fmt_prec(f, PREC_POW)?;
                }
                Ok(())
            }
            ExprNode::Pow { base, exp } => {
                base.fmt_prec(f, PREC_ATOM)?;
                f.write_str("^")?;
                exp.fmt_prec(f, PREC_ATOM)
            }
            ExprNode::Function { func, args } => {
                write!(f, "{func}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
            ExprNode::Derivative(inner) => write!(f, "D({inner})"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f)
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SymbolRegistry;

    fn symbols() -> (SymbolRegistry, Expr, Expr) {
        let mut reg = SymbolRegistry::new();
        let x = Expr::symbol(reg.declare_parameter("x").unwrap().symbol());
        let y = Expr::symbol(reg.declare_parameter("y").unwrap().symbol());
        (reg, x, y)
    }

    #[test]
    fn test_constant_folding() {
        let (_reg, x, _) = symbols();
        assert_eq!(Expr::integer(2) + Expr::integer(3), Expr::integer(5));
        assert_eq!(Expr::integer(0) * x.clone(), Expr::zero());
        assert_eq!(Expr::one() * x.clone(), x);
        assert_eq!(x.clone() + Expr::zero(), x);
        assert_eq!(Expr::powi(Expr::rational(2, 3), -2), Expr::rational(9, 4));
        assert_eq!(Expr::powi(x.clone(), 1), x);
        assert_eq!(Expr::powi(x.clone(), 0), Expr::one());
    }

    #[test]
    fn test_zero_to_negative_power_stays_symbolic() {
        let e = Expr::powi(Expr::zero(), -1);
        assert!(matches!(e.node(), ExprNode::Pow { .. }));
    }

    #[test]
    fn test_oversized_numeric_power_stays_symbolic() {
        let e = Expr::powi(Expr::integer(2), 1_000_000_000_000);
        assert!(matches!(e.node(), ExprNode::Pow { .. }));
    }

    #[test]
    fn test_flattening() {
        let (_reg, x, y) = symbols();
        let sum = (x.clone() + y.clone()) + (x.clone() + Expr::integer(1));
        match sum.node() {
            ExprNode::Add(terms) => assert_eq!(terms.len(), 4),
            other => panic!("expected sum, got {other:?}"),
        }
        let prod = (Expr::integer(2) * x.clone()) * (Expr::integer(3) * y);
        match prod.node() {
            ExprNode::Mul(factors) => {
                assert_eq!(factors.len(), 3);
                assert_eq!(factors[0], Expr::integer(6));
            }
            other => panic!("expected product, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_integer_power() {
        let (_reg, x, _) = symbols();
        let root = Expr::sqrt(x.clone());
        assert_eq!(Expr::powi(root, 2), x);
    }

    #[test]
    fn test_function_folding() {
        assert_eq!(Expr::sin(Expr::zero()), Expr::zero());
        assert_eq!(Expr::cos(Expr::zero()), Expr::one());
        assert_eq!(Expr::func(Function::Log, [Expr::one()]), Expr::zero());
        assert_eq!(Expr::derivative(Expr::integer(4)), Expr::zero());
    }

    #[test]
    fn test_queries() {
        let (_reg, x, y) = symbols();
        let e = Expr::sin(x.clone()) * Expr::derivative(y.clone());
        let syms = e.free_symbols();
        assert_eq!(syms.len(), 2);
        assert!(e.contains_symbol(x.as_symbol().unwrap()));
        assert!(e.contains_derivative());
        assert_eq!(e.node_count(), 5);

        let replaced = e.substitute(y.as_symbol().unwrap(), &Expr::integer(3));
        assert_eq!(replaced, Expr::zero());
    }

    #[test]
    fn test_display() {
        let (_reg, x, y) = symbols();
        assert_eq!((x.clone() - y.clone()).to_string(), "x - y");
        assert_eq!((-x.clone()).to_string(), "-x");
        assert_eq!(
            (Expr::rational(1, 2) * x.clone() * Expr::powi(y.clone(), 2)).to_string(),
            "(1/2)*x*y^2"
        );
        assert_eq!(
            Expr::powi(x.clone() + y.clone(), -1).to_string(),
            "(x + y)^(-1)"
        );
        assert_eq!(
            (Expr::integer(-3) * Expr::sin(x.clone() - y)).to_string(),
            "-3*sin(x - y)"
        );
        assert_eq!(Expr::derivative(x).to_string(), "D(x)");
    }

    #[test]
    fn test_structural_equality_is_not_commutative() {
        let (_reg, x, y) = symbols();
        assert_ne!(x.clone() + y.clone(), y + x);
    }
}
