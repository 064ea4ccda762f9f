//! Argument extraction shared by the builtin tool handlers.

use serde_json::Value;

use crate::error::{AgentError, AgentResult};

pub(crate) fn required_string(input: &Value, key: &str) -> AgentResult<String> {
    let value = input
        .get(key)
        .and_then(|raw| raw.as_str())
        .ok_or_else(|| AgentError::InvalidInput(format!("missing {key}")))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AgentError::InvalidInput(format!("missing {key}")));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn optional_string(input: &Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

pub(crate) fn required_i64(input: &Value, key: &str) -> AgentResult<i64> {
    input
        .get(key)
        .and_then(|raw| raw.as_i64())
        .ok_or_else(|| AgentError::InvalidInput(format!("missing {key}")))
}

/// Amounts and voucher values arrive in cents; zero and negatives are
/// caller mistakes, never store writes.
pub(crate) fn required_positive_cents(input: &Value, key: &str) -> AgentResult<i64> {
    let cents = required_i64(input, key)?;
    if cents <= 0 {
        return Err(AgentError::InvalidInput(format!(
            "{key} must be a positive amount in cents"
        )));
    }
    Ok(cents)
}
