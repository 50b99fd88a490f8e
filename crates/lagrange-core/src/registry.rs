//! The per-session symbol registry.
//!
//! The registry interns every coordinate, derived velocity/acceleration and
//! parameter name of one derivation session and hands out symbols whose
//! identity is unique to that session.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::expr::Expr;
use crate::symbol::{Symbol, SymbolId, SymbolRole};

static NEXT_SESSION: AtomicU32 = AtomicU32::new(0);

/// How a derived name is formed from a coordinate name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affix {
    /// `d` + `theta` = `dtheta`
    Prefix(String),
    /// `theta` + `_dot` = `theta_dot`
    Suffix(String),
}

impl Affix {
    /// Applies the affix to a base name.
    #[must_use]
    pub fn apply(&self, base: &str) -> String {
        match self {
            Affix::Prefix(p) => format!("{p}{base}"),
            Affix::Suffix(s) => format!("{base}{s}"),
        }
    }
}

/// Naming rules for the velocity and acceleration symbols of a coordinate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Affix forming the velocity name from the coordinate name.
    pub velocity: Affix,
    /// Affix forming the acceleration name from the coordinate name.
    pub acceleration: Affix,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            velocity: Affix::Prefix("d".to_string()),
            acceleration: Affix::Prefix("dd".to_string()),
        }
    }
}

/// One degree of freedom: a position symbol and its two time derivatives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneralizedCoordinate {
    index: usize,
    position: Symbol,
    velocity: Symbol,
    acceleration: Symbol,
}

impl GeneralizedCoordinate {
    /// Position in declaration order.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The coordinate name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.position.name()
    }

    /// The position symbol `q`.
    #[must_use]
    pub fn position(&self) -> &Symbol {
        &self.position
    }

    /// The velocity symbol `q'`.
    #[must_use]
    pub fn velocity(&self) -> &Symbol {
        &self.velocity
    }

    /// The acceleration symbol `q''`.
    #[must_use]
    pub fn acceleration(&self) -> &Symbol {
        &self.acceleration
    }

    /// `q` as an expression.
    #[must_use]
    pub fn q(&self) -> Expr {
        Expr::symbol(&self.position)
    }

    /// `qdot` as an expression.
    #[must_use]
    pub fn qdot(&self) -> Expr {
        Expr::symbol(&self.velocity)
    }

    /// `qddot` as an expression.
    #[must_use]
    pub fn qddot(&self) -> Expr {
        Expr::symbol(&self.acceleration)
    }
}

/// A named time-independent constant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    symbol: Symbol,
}

impl Parameter {
    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.symbol.name()
    }

    /// The parameter symbol.
    #[must_use]
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// The parameter as an expression.
    #[must_use]
    pub fn expr(&self) -> Expr {
        Expr::symbol(&self.symbol)
    }
}

/// Symbol table of one derivation session.
///
/// Never share a registry between sessions: symbol identity is only
/// meaningful inside the registry that issued it.
#[derive(Debug)]
pub struct SymbolRegistry {
    session: u32,
    naming: NamingConvention,
    /// All symbols, indexed by `SymbolId::index`.
    symbols: Vec<Symbol>,
    /// Name lookup for every declared or derived name.
    by_name: HashMap<Arc<str>, u32>,
    coordinates: Vec<GeneralizedCoordinate>,
    parameters: Vec<Parameter>,
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolRegistry {
    /// Creates a registry for a fresh session with the default naming.
    #[must_use]
    pub fn new() -> Self {
        Self::with_naming(NamingConvention::default())
    }

    /// Creates a registry for a fresh session.
    #[must_use]
    pub fn with_naming(naming: NamingConvention) -> Self {
        Self {
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
            naming,
            symbols: Vec::new(),
            by_name: HashMap::new(),
            coordinates: Vec::new(),
            parameters: Vec::new(),
        }
    }

    /// Identifier of the session this registry belongs to.
    #[must_use]
    pub fn session(&self) -> u32 {
        self.session
    }

    /// The naming convention for derived symbols.
    #[must_use]
    pub fn naming(&self) -> &NamingConvention {
        &self.naming
    }

    /// Declares a generalized coordinate together with its velocity and
    /// acceleration symbols.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::DuplicateSymbol`] if the name or one of its
    /// derived names is already taken, and with
    /// [`CoreError::InvalidSymbolName`] for malformed names.
    pub fn declare_coordinate(&mut self, name: &str) -> Result<GeneralizedCoordinate> {
        validate_name(name)?;
        let velocity_name = self.naming.velocity.apply(name);
        let acceleration_name = self.naming.acceleration.apply(name);

        let names = [name, velocity_name.as_str(), acceleration_name.as_str()];
        for (i, candidate) in names.iter().enumerate() {
            if self.by_name.contains_key(*candidate) || names[..i].contains(candidate) {
                return Err(CoreError::DuplicateSymbol {
                    name: (*candidate).to_string(),
                });
            }
        }

        let index = self.coordinates.len();
        let coordinate = GeneralizedCoordinate {
            index,
            position: self.intern(name, SymbolRole::Position(index)),
            velocity: self.intern(&velocity_name, SymbolRole::Velocity(index)),
            acceleration: self.intern(&acceleration_name, SymbolRole::Acceleration(index)),
        };
        tracing::trace!(
            session = self.session,
            coordinate = name,
            velocity = %velocity_name,
            acceleration = %acceleration_name,
            "declared coordinate"
        );
        self.coordinates.push(coordinate.clone());
        Ok(coordinate)
    }

    /// Declares a parameter.
    ///
    /// # Errors
    ///
    /// Fails with [`CoreError::DuplicateSymbol`] if the name is taken, and
    /// with [`CoreError::InvalidSymbolName`] for malformed names.
    pub fn declare_parameter(&mut self, name: &str) -> Result<Parameter> {
        validate_name(name)?;
        if self.by_name.contains_key(name) {
            return Err(CoreError::DuplicateSymbol {
                name: name.to_string(),
            });
        }
        let parameter = Parameter {
            symbol: self.intern(name, SymbolRole::Parameter),
        };
        tracing::trace!(session = self.session, parameter = name, "declared parameter");
        self.parameters.push(parameter.clone());
        Ok(parameter)
    }

    /// Looks a symbol up by name. Derived velocity and acceleration names
    /// resolve too.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] for unknown names.
    pub fn resolve(&self, name: &str) -> Result<&Symbol> {
        self.by_name
            .get(name)
            .map(|&index| &self.symbols[index as usize])
            .ok_or_else(|| CoreError::NotFound {
                name: name.to_string(),
            })
    }

    /// Returns true if `symbol` was issued by this registry.
    #[must_use]
    pub fn contains(&self, symbol: &Symbol) -> bool {
        let id = symbol.id();
        id.session() == self.session
            && self
                .symbols
                .get(id.index() as usize)
                .is_some_and(|s| s.id() == id)
    }

    /// Coordinates in declaration order.
    #[must_use]
    pub fn coordinates(&self) -> &[GeneralizedCoordinate] {
        &self.coordinates
    }

    /// Parameters in declaration order.
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// The coordinate at `index`, in declaration order.
    #[must_use]
    pub fn coordinate(&self, index: usize) -> Option<&GeneralizedCoordinate> {
        self.coordinates.get(index)
    }

    /// The coordinate a position, velocity or acceleration symbol belongs
    /// to.
    #[must_use]
    pub fn coordinate_of(&self, symbol: &Symbol) -> Option<&GeneralizedCoordinate> {
        if !self.contains(symbol) {
            return None;
        }
        symbol
            .role()
            .coordinate()
            .and_then(|i| self.coordinates.get(i))
    }

    /// Acceleration symbols in coordinate order.
    pub fn accelerations(&self) -> impl Iterator<Item = &Symbol> {
        self.coordinates.iter().map(GeneralizedCoordinate::acceleration)
    }

    /// Velocity symbols in coordinate order.
    pub fn velocities(&self) -> impl Iterator<Item = &Symbol> {
        self.coordinates.iter().map(GeneralizedCoordinate::velocity)
    }

    /// Total number of interned symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns true if nothing has been declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn intern(&mut self, name: &str, role: SymbolRole) -> Symbol {
        let index = u32::try_from(self.symbols.len()).unwrap_or(u32::MAX);
        let name: Arc<str> = Arc::from(name);
        let symbol = Symbol::new(SymbolId::new(self.session, index), name.clone(), role);
        self.symbols.push(symbol.clone());
        self.by_name.insert(name, index);
        symbol
    }
}

/// Names are `[A-Za-z_][A-Za-z0-9_.]*`; dots allow namespaced names such
/// as `mass_1.angle`.
fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidSymbolName {
            name: name.to_string(),
        })
    }
}
