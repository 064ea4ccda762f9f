//! Gift voucher issue and redemption.

use std::sync::Arc;

use darkroom_studio::SharedDirectory;
use serde_json::json;

use super::args::{optional_string, required_positive_cents, required_string};
use crate::error::AgentError;
use crate::permissions::scopes::scope_set;
use crate::tools::handler::MutationTool;
use crate::tools::schema::{RiskLevel, ToolDefinition};

pub fn issue(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "vouchers.issue",
        RiskLevel::Medium,
        Arc::new(MutationTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let value_cents = required_positive_cents(&args, "value_cents")?;
                let client_id = optional_string(&args, "client_id");
                let voucher = directory
                    .issue_voucher(client_id, value_cents)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&voucher).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize voucher: {error}"))
                })
            }
        })),
    )
    .with_description("issue a gift voucher, optionally tied to a client")
    .with_scopes(scope_set(&["vouchers.write"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["value_cents"],
        "properties": {
            "value_cents": {"type": "integer"},
            "client_id": {"type": "string"}
        }
    }))
}

pub fn redeem(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "vouchers.redeem",
        RiskLevel::Medium,
        Arc::new(MutationTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let code = required_string(&args, "code")?;
                let voucher = directory
                    .redeem_voucher(&code)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&voucher).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize voucher: {error}"))
                })
            }
        })),
    )
    .with_description("redeem a voucher by code")
    .with_scopes(scope_set(&["vouchers.write"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["code"],
        "properties": {
            "code": {"type": "string"}
        }
    }))
}
