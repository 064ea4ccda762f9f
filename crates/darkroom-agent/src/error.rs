use std::fmt;

use crate::permissions::scopes::{Scope, SessionMode};

/// Unified error type for the darkroom-agent crate.
#[derive(Debug, Clone)]
pub enum AgentError {
    /// No tool with the requested name is registered.
    UnknownTool(String),
    /// A tool with this name is already registered.
    DuplicateTool(String),
    /// Arguments failed schema validation before invocation.
    InvalidArguments(String),
    /// The gate refused the call; carries the scopes the session lacked.
    AuthorizationDenied {
        missing_scopes: Vec<Scope>,
        reason: String,
    },
    /// The tool handler itself returned an error.
    HandlerFailed(String),
    /// An audit record could not be persisted. Halts the session.
    AuditWrite(String),
    /// The handler exceeded its time budget; the external effect is unknown.
    Timeout { tool: String, timeout_ms: u64 },
    /// No session with the given id exists.
    SessionNotFound(String),
    /// Requested scopes exceed what the session mode permits.
    ScopeCeiling {
        mode: SessionMode,
        scopes: Vec<Scope>,
    },
    /// Invalid input provided by the caller.
    InvalidInput(String),
    /// Internal error.
    Internal(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::UnknownTool(name) => write!(f, "unknown tool: '{name}'"),
            AgentError::DuplicateTool(name) => write!(f, "duplicate tool: '{name}'"),
            AgentError::InvalidArguments(msg) => write!(f, "invalid arguments: {msg}"),
            AgentError::AuthorizationDenied { reason, .. } => {
                write!(f, "authorization denied: {reason}")
            }
            AgentError::HandlerFailed(msg) => write!(f, "handler failed: {msg}"),
            AgentError::AuditWrite(msg) => write!(f, "audit write failed: {msg}"),
            AgentError::Timeout { tool, timeout_ms } => {
                write!(f, "tool '{tool}' timed out after {timeout_ms}ms (effect unknown)")
            }
            AgentError::SessionNotFound(id) => write!(f, "session not found: {id}"),
            AgentError::ScopeCeiling { mode, scopes } => {
                let listed = scopes
                    .iter()
                    .map(Scope::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "scopes [{listed}] exceed the {mode} ceiling")
            }
            AgentError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            AgentError::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for AgentError {}

/// Result type alias using [`AgentError`].
pub type AgentResult<T> = Result<T, AgentError>;
