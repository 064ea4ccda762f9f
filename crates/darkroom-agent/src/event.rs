use serde::Serialize;

use crate::permissions::scopes::ScopeSet;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum AgentEvent {
    SessionCreated(SessionLifecyclePayload),
    SessionEscalated(SessionEscalatedPayload),
    SessionAborted(SessionLifecyclePayload),
    /// One per invocation attempt, allowed or not.
    ToolExecuted(ToolExecutedPayload),
    AuditWriteFailed(AuditWriteFailedPayload),
    ShadowCompared(ShadowComparedPayload),
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionLifecyclePayload {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionEscalatedPayload {
    pub session_id: String,
    pub scopes: ScopeSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolExecutedPayload {
    pub session_id: String,
    pub audit_id: String,
    pub tool: String,
    pub ok: bool,
    pub simulated: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditWriteFailedPayload {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShadowComparedPayload {
    pub session_id: String,
    pub comparison_id: String,
    pub equivalent: bool,
}
