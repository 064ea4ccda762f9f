use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::time::now_rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
    Tool,
}

/// One transcript entry. Append-only; ordered within a session by
/// `created_at`, ties broken by `seq`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    /// Per-session insertion sequence, assigned at append time.
    pub seq: u64,
    pub role: MessageRole,
    pub content: String,
    /// For tool-role messages, the id of the audit record that produced
    /// the content.
    pub tool_call_id: Option<String>,
    pub created_at: String,
}

impl Message {
    pub fn new(session_id: &str, role: MessageRole, content: impl Into<String>) -> Message {
        Message {
            id: Uuid::now_v7().to_string(),
            session_id: session_id.to_string(),
            seq: 0,
            role,
            content: content.into(),
            tool_call_id: None,
            created_at: now_rfc3339(),
        }
    }

    pub fn with_tool_call_id(mut self, tool_call_id: impl Into<String>) -> Message {
        self.tool_call_id = Some(tool_call_id.into());
        self
    }
}
