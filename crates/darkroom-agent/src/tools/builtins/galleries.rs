//! Client gallery publication.

use std::sync::Arc;

use darkroom_studio::SharedDirectory;
use serde_json::json;

use super::args::required_string;
use crate::error::AgentError;
use crate::permissions::scopes::scope_set;
use crate::tools::handler::MutationTool;
use crate::tools::schema::{RiskLevel, ToolDefinition};

pub fn publish(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "galleries.publish",
        RiskLevel::Medium,
        Arc::new(MutationTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let gallery_id = required_string(&args, "gallery_id")?;
                let gallery = directory
                    .publish_gallery(&gallery_id)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&gallery).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize gallery: {error}"))
                })
            }
        })),
    )
    .with_description("make a client gallery publicly visible")
    .with_scopes(scope_set(&["galleries.write"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["gallery_id"],
        "properties": {
            "gallery_id": {"type": "string"}
        }
    }))
}
