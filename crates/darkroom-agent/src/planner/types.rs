use crate::tools::schema::{RiskLevel, ToolDefinition};

/// Minimal tool metadata exposed to planners.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub risk: RiskLevel,
    pub input_schema: serde_json::Value,
}

impl From<&ToolDefinition> for ToolSpec {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            risk: tool.risk,
            input_schema: tool.input_schema.clone(),
        }
    }
}

/// Structured input to a planner: what the user wants and which tools
/// exist to want it with.
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub goal: String,
    pub tools: Vec<ToolSpec>,
}
