//! Invoice reporting and issuance.

use std::sync::Arc;

use darkroom_studio::SharedDirectory;
use serde_json::json;

use super::args::{optional_string, required_positive_cents, required_string};
use crate::error::AgentError;
use crate::permissions::scopes::scope_set;
use crate::tools::handler::{MutationTool, QueryTool};
use crate::tools::schema::{RiskLevel, ToolDefinition};

pub fn report(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "invoices.report",
        RiskLevel::Low,
        Arc::new(QueryTool::new(move |_args| {
            let directory = directory.clone();
            async move {
                let summary = directory
                    .invoice_summary()
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&summary).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize invoice summary: {error}"))
                })
            }
        })),
    )
    .with_description("summarize issued, paid, and outstanding revenue")
    .with_scopes(scope_set(&["invoices.read"]))
    .with_input_schema(json!({"type": "object"}))
}

pub fn issue(directory: SharedDirectory) -> ToolDefinition {
    ToolDefinition::new(
        "invoices.issue",
        RiskLevel::Medium,
        Arc::new(MutationTool::new(move |args| {
            let directory = directory.clone();
            async move {
                let client_id = required_string(&args, "client_id")?;
                let amount_cents = required_positive_cents(&args, "amount_cents")?;
                let memo = optional_string(&args, "memo");
                let invoice = directory
                    .issue_invoice(&client_id, amount_cents, memo)
                    .await
                    .map_err(|error| AgentError::HandlerFailed(error.to_string()))?;
                serde_json::to_value(&invoice).map_err(|error| {
                    AgentError::Internal(format!("failed to serialize invoice: {error}"))
                })
            }
        })),
    )
    .with_description("issue an invoice to a client, amount in cents")
    .with_scopes(scope_set(&["invoices.write"]))
    .with_input_schema(json!({
        "type": "object",
        "required": ["client_id", "amount_cents"],
        "properties": {
            "client_id": {"type": "string"},
            "amount_cents": {"type": "integer"},
            "memo": {"type": "string"}
        }
    }))
}
