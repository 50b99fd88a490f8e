//! Symbols and their identities.
//!
//! A symbol is identified by its [`SymbolId`] alone. The name is carried
//! along for display and export, but two symbols with the same name from
//! different sessions are different symbols.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Unique identity of a symbol: the issuing session plus a dense index
/// into that session's registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId {
    session: u32,
    index: u32,
}

impl SymbolId {
    pub(crate) const fn new(session: u32, index: u32) -> Self {
        Self { session, index }
    }

    /// The session (registry) that issued this symbol.
    #[must_use]
    pub const fn session(self) -> u32 {
        self.session
    }

    /// Index of the symbol inside its registry.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }
}

/// What a symbol stands for in the mechanical model.
///
/// The `usize` payload is the declaration index of the owning coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymbolRole {
    /// Generalized coordinate `q_i`.
    Position(usize),
    /// First time derivative `qdot_i`.
    Velocity(usize),
    /// Second time derivative `qddot_i`.
    Acceleration(usize),
    /// Time-independent constant (mass, length, gravity, ...).
    Parameter,
}

impl SymbolRole {
    /// Index of the owning coordinate, if any.
    #[must_use]
    pub fn coordinate(self) -> Option<usize> {
        match self {
            SymbolRole::Position(i) | SymbolRole::Velocity(i) | SymbolRole::Acceleration(i) => {
                Some(i)
            }
            SymbolRole::Parameter => None,
        }
    }
}

/// A registry-issued symbol.
#[derive(Clone)]
pub struct Symbol {
    id: SymbolId,
    name: Arc<str>,
    role: SymbolRole,
}

impl Symbol {
    pub(crate) fn new(id: SymbolId, name: Arc<str>, role: SymbolRole) -> Self {
        Self { id, name, role }
    }

    /// Declaration order within the owning registry.
    #[must_use]
    pub fn id(&self) -> SymbolId {
        self.id
    }

    /// The display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What the symbol stands for.
    #[must_use]
    pub fn role(&self) -> SymbolRole {
        self.role
    }

    /// Returns true for an acceleration symbol.
    #[must_use]
    pub fn is_acceleration(&self) -> bool {
        matches!(self.role, SymbolRole::Acceleration(_))
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Symbol({}#{}:{})",
            self.name, self.id.session, self.id.index
        )
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
