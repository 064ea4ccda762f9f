pub mod gate;
pub mod scopes;

pub use gate::{authorize, GateDecision};
pub use scopes::{scope_set, Scope, ScopeSet, SessionMode};
