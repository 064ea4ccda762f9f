//! Authorization scopes and session mode ceilings.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A dotted `domain.action` authorization token, e.g. `clients.read`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(String);

impl Scope {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A scope is read-class iff its action segment is exactly `read`.
    pub fn is_read_class(&self) -> bool {
        matches!(self.0.rsplit_once('.'), Some((_, "read")))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type ScopeSet = BTreeSet<Scope>;

/// Build a scope set from string tokens.
pub fn scope_set(tokens: &[&str]) -> ScopeSet {
    tokens.iter().map(|token| Scope::new(*token)).collect()
}

/// Write capability of a session, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    ReadOnly,
    ReadWrite,
}

impl SessionMode {
    /// Whether this mode's ceiling admits the scope at all.
    pub fn admits(&self, scope: &Scope) -> bool {
        match self {
            SessionMode::ReadWrite => true,
            SessionMode::ReadOnly => scope.is_read_class(),
        }
    }

    /// Scopes from the set that fall outside this mode's ceiling.
    pub fn ceiling_violations(&self, scopes: &ScopeSet) -> Vec<Scope> {
        scopes
            .iter()
            .filter(|scope| !self.admits(scope))
            .cloned()
            .collect()
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionMode::ReadOnly => write!(f, "read_only"),
            SessionMode::ReadWrite => write!(f, "read_write"),
        }
    }
}
