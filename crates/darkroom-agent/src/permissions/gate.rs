//! Pure authorization decisions for tool calls.

use crate::error::{AgentError, AgentResult};
use crate::permissions::scopes::{Scope, SessionMode};
use crate::session::store::Session;
use crate::tools::schema::{RiskLevel, ToolDefinition};

/// Outcome of gating one tool call against one session. Side-effect free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed,
    Denied {
        missing_scopes: Vec<Scope>,
        reason: String,
    },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateDecision::Allowed)
    }

    pub fn into_result(self) -> AgentResult<()> {
        match self {
            GateDecision::Allowed => Ok(()),
            GateDecision::Denied {
                missing_scopes,
                reason,
            } => Err(AgentError::AuthorizationDenied {
                missing_scopes,
                reason,
            }),
        }
    }
}

/// Allow iff the tool's required scopes are a subset of the session's
/// grants, and additionally the session is read_write when the tool is
/// high risk. Purely a function of its inputs.
pub fn authorize(session: &Session, tool: &ToolDefinition) -> GateDecision {
    let missing: Vec<Scope> = tool
        .required_scopes
        .iter()
        .filter(|scope| !session.scopes.contains(*scope))
        .cloned()
        .collect();
    if !missing.is_empty() {
        let listed = missing
            .iter()
            .map(Scope::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        return GateDecision::Denied {
            reason: format!(
                "session {} lacks scopes [{listed}] required by tool '{}'",
                session.id, tool.name
            ),
            missing_scopes: missing,
        };
    }

    if tool.risk == RiskLevel::High && session.mode != SessionMode::ReadWrite {
        return GateDecision::Denied {
            missing_scopes: Vec::new(),
            reason: format!(
                "tool '{}' is high risk and requires a read_write session",
                tool.name
            ),
        };
    }

    GateDecision::Allowed
}
