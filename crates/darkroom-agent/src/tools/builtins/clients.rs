//! Client lookup and contact maintenance.

use std::sync::Arc;

use darkroom_studio::SharedDirectory;
use serde_json::json;

use super::args::{optional_string, required_string};
use crate::error::AgentError;
use crate::permissions::scopes::scope_set;
use crate::tools::handler::{MutationTool, QueryTool};
use crate::tools::schema::{RiskLevel, ToolDefinition};

pub fn lookup(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "clients.lookup",
        RiskLevel::Low,
        Arc::new(QueryTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let query = required_string(&args, "query")?;
                let clients = directory
                    .search_clients(&query)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                let clients = serde_json::to_value(&clients).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize clients: {error}"))
                })?;
                Ok(json!({"clients": clients}))
            }
        })),
    )
    .with_description("search clients by name or email")
    .with_scopes(scope_set(&["clients.read"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["query"],
        "properties": {
            "query": {"type": "string"}
        }
    }))
}

pub fn update(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "clients.update",
        RiskLevel::Medium,
        Arc::new(MutationTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let client_id = required_string(&args, "client_id")?;
                let email = optional_string(&args, "email");
                let phone = optional_string(&args, "phone");
                if email.is_none() && phone.is_none() {
                    return Err(AgentError::InvalidInput(
                        "nothing to update: provide email or phone".to_string(),
                    ));
                }
                let client = directory
                    .update_client_contact(&client_id, email, phone)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&client).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize client: {error}"))
                })
            }
        })),
    )
    .with_description("update a client's email or phone")
    .with_scopes(scope_set(&["clients.write"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["client_id"],
        "properties": {
            "client_id": {"type": "string"},
            "email": {"type": "string"},
            "phone": {"type": "string"}
        }
    }))
}
