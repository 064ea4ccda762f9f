//! Tool definitions and JSON Schema validation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AgentError, AgentResult};
use crate::permissions::scopes::ScopeSet;
use crate::tools::handler::ToolHandler;

/// Risk classification for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Tool has no side effects and may run in shadow comparisons.
    Low,
    /// Tool mutates studio state.
    Medium,
    /// Tool has outward-facing or irreversible effects.
    High,
}

/// Complete tool definition: identity, contract, risk, and handler.
///
/// Immutable once registered.
pub struct ToolDefinition {
    /// Unique name, the registry key.
    pub name: String,
    pub description: String,
    /// Risk classification; high-risk tools need a read_write session.
    pub risk: RiskLevel,
    /// Scopes the session must hold, all of them.
    pub required_scopes: ScopeSet,
    /// JSON Schema for validating input arguments.
    pub input_schema: serde_json::Value,
    /// Per-tool time budget; the executor default applies when unset.
    pub timeout_ms: Option<u64>,
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("risk", &self.risk)
            .field("required_scopes", &self.required_scopes)
            .field("input_schema", &self.input_schema)
            .field("timeout_ms", &self.timeout_ms)
            .finish_non_exhaustive()
    }
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, risk: RiskLevel, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            risk,
            required_scopes: ScopeSet::new(),
            input_schema: json!({}),
            timeout_ms: None,
            handler,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_scopes(mut self, scopes: ScopeSet) -> Self {
        self.required_scopes = scopes;
        self
    }

    pub fn with_input_schema(mut self, schema: serde_json::Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn validate_args(&self, args: &serde_json::Value) -> AgentResult<()> {
        validate_schema(args, &self.input_schema)
    }
}

/// Validate a JSON value against a minimal JSON Schema subset.
///
/// Supports: `type`, `required`, `properties` (recursive).
/// An empty schema `{}` passes anything.
pub fn validate_schema(value: &serde_json::Value, schema: &serde_json::Value) -> AgentResult<()> {
    let schema_obj = match schema.as_object() {
        Some(obj) => obj,
        None => return Ok(()),
    };

    if schema_obj.is_empty() {
        return Ok(());
    }

    if let Some(type_val) = schema_obj.get("type") {
        let type_str = type_val.as_str().ok_or_else(|| {
            AgentError::Internal("schema 'type' must be a string".to_string())
        })?;

        let matches = match type_str {
            "string" => value.is_string(),
            "number" => value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "boolean" => value.is_boolean(),
            "object" => value.is_object(),
            "array" => value.is_array(),
            "null" => value.is_null(),
            other => {
                return Err(AgentError::Internal(format!("unknown schema type: {other}")));
            }
        };

        if !matches {
            return Err(AgentError::InvalidArguments(format!(
                "expected type '{type_str}', got {}",
                json_type_name(value)
            )));
        }
    }

    if let Some(required) = schema_obj.get("required") {
        if let Some(required_arr) = required.as_array() {
            if let Some(obj) = value.as_object() {
                for req in required_arr {
                    if let Some(key) = req.as_str() {
                        if !obj.contains_key(key) {
                            return Err(AgentError::InvalidArguments(format!(
                                "missing required field: '{key}'"
                            )));
                        }
                    }
                }
            }
        }
    }

    if let Some(properties) = schema_obj.get("properties") {
        if let (Some(props_obj), Some(val_obj)) = (properties.as_object(), value.as_object()) {
            for (key, prop_schema) in props_obj {
                if let Some(prop_value) = val_obj.get(key) {
                    validate_schema(prop_value, prop_schema)?;
                }
            }
        }
    }

    Ok(())
}

/// Returns a human-readable name for the JSON type of a value.
fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::scopes::scope_set;
    use crate::tools::handler::QueryTool;
    use serde_json::json;

    #[test]
    fn validate_string_pass() {
        let schema = json!({"type": "string"});
        assert!(validate_schema(&json!("hello"), &schema).is_ok());
    }

    #[test]
    fn validate_string_fail() {
        let schema = json!({"type": "string"});
        assert!(validate_schema(&json!(42), &schema).is_err());
    }

    #[test]
    fn validate_integer_rejects_float() {
        let schema = json!({"type": "integer"});
        assert!(validate_schema(&json!(42), &schema).is_ok());
        assert!(validate_schema(&json!(3.14), &schema).is_err());
    }

    #[test]
    fn validate_boolean() {
        let schema = json!({"type": "boolean"});
        assert!(validate_schema(&json!(true), &schema).is_ok());
        assert!(validate_schema(&json!(1), &schema).is_err());
    }

    #[test]
    fn validate_array_and_object() {
        assert!(validate_schema(&json!([1, 2, 3]), &json!({"type": "array"})).is_ok());
        assert!(validate_schema(&json!({}), &json!({"type": "array"})).is_err());
        assert!(validate_schema(&json!({"key": "value"}), &json!({"type": "object"})).is_ok());
        assert!(validate_schema(&json!([]), &json!({"type": "object"})).is_err());
    }

    #[test]
    fn validate_required_fields() {
        let schema = json!({
            "type": "object",
            "required": ["query"]
        });
        assert!(validate_schema(&json!({"query": "mara"}), &schema).is_ok());

        let err = validate_schema(&json!({}), &schema).expect_err("missing field");
        assert!(matches!(err, AgentError::InvalidArguments(_)));
    }

    #[test]
    fn validate_properties_recursively() {
        let schema = json!({
            "type": "object",
            "properties": {
                "client_id": {"type": "string"},
                "amount_cents": {"type": "integer"}
            }
        });
        let ok = json!({"client_id": "c-1", "amount_cents": 5000});
        assert!(validate_schema(&ok, &schema).is_ok());

        let bad = json!({"client_id": "c-1", "amount_cents": "a lot"});
        assert!(validate_schema(&bad, &schema).is_err());
    }

    #[test]
    fn empty_schema_passes_anything() {
        let schema = json!({});
        assert!(validate_schema(&json!("string"), &schema).is_ok());
        assert!(validate_schema(&json!(42), &schema).is_ok());
        assert!(validate_schema(&json!(null), &schema).is_ok());
        assert!(validate_schema(&json!({"key": "val"}), &schema).is_ok());
    }

    #[test]
    fn malformed_schema_is_internal_error() {
        let schema = json!({"type": 7});
        let err = validate_schema(&json!("x"), &schema).expect_err("bad schema");
        assert!(matches!(err, AgentError::Internal(_)));
    }

    #[test]
    fn risk_level_serde_roundtrip() {
        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            let encoded = serde_json::to_string(&level).unwrap();
            let decoded: RiskLevel = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, level);
        }
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"high\"");
    }

    #[test]
    fn definition_builder_sets_contract() {
        let tool = ToolDefinition::new(
            "clients.lookup",
            RiskLevel::Low,
            std::sync::Arc::new(QueryTool::new(|_args| async { Ok(json!([])) })),
        )
        .with_description("look up clients by name or email")
        .with_scopes(scope_set(&["clients.read"]))
        .with_input_schema(json!({"type": "object", "required": ["query"]}))
        .with_timeout_ms(5_000);

        assert_eq!(tool.name, "clients.lookup");
        assert_eq!(tool.risk, RiskLevel::Low);
        assert_eq!(tool.timeout_ms, Some(5_000));
        assert!(tool.validate_args(&json!({"query": "mara"})).is_ok());
        assert!(tool.validate_args(&json!({})).is_err());
    }
}
