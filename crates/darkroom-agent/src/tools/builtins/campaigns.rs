//! Marketing campaign dispatch through the studio's mail queue.

use std::sync::Arc;

use darkroom_studio::SharedDirectory;
use serde_json::json;

use super::args::required_string;
use crate::error::AgentError;
use crate::permissions::scopes::scope_set;
use crate::tools::handler::ExternalCallTool;
use crate::tools::schema::{RiskLevel, ToolDefinition};

/// Outward-facing and irreversible once the queue picks it up, so this
/// is the one high-risk builtin: read_write sessions only.
pub fn send(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "campaigns.send",
        RiskLevel::High,
        Arc::new(ExternalCallTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let segment = required_string(&args, "segment")?;
                let subject = required_string(&args, "subject")?;
                let receipt = directory
                    .enqueue_campaign(&segment, &subject)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&receipt).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize campaign receipt: {error}"))
                })
            }
        })),
    )
    .with_description("send a marketing email campaign to a client segment")
    .with_scopes(scope_set(&["campaigns.send"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["segment", "subject"],
        "properties": {
            "segment": {"type": "string"},
            "subject": {"type": "string"}
        }
    }))
    .with_timeout_ms(10_000)
}
