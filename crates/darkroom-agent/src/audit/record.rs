use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::utils::time::now_rfc3339;

/// One entry per tool invocation attempt. Append-only; the sole
/// forensic truth for what the agent did or tried to do.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    pub id: String,
    pub session_id: String,
    /// Per-session insertion sequence, assigned at persist time.
    pub seq: u64,
    /// Tool name as requested, even when no such tool is registered.
    pub tool: String,
    pub args: Value,
    pub result: Option<Value>,
    pub ok: bool,
    pub error: Option<String>,
    pub duration_ms: u64,
    /// True when the handler ran its dry-run path instead of the real one.
    pub simulated: bool,
    pub created_at: String,
}

impl AuditRecord {
    pub fn success(
        session_id: &str,
        tool: &str,
        args: Value,
        result: Value,
        duration_ms: u64,
        simulated: bool,
    ) -> AuditRecord {
        AuditRecord {
            id: Uuid::now_v7().to_string(),
            session_id: session_id.to_string(),
            seq: 0,
            tool: tool.to_string(),
            args,
            result: Some(result),
            ok: true,
            error: None,
            duration_ms,
            simulated,
            created_at: now_rfc3339(),
        }
    }

    pub fn failure(
        session_id: &str,
        tool: &str,
        args: Value,
        error: String,
        duration_ms: u64,
        simulated: bool,
    ) -> AuditRecord {
        AuditRecord {
            id: Uuid::now_v7().to_string(),
            session_id: session_id.to_string(),
            seq: 0,
            tool: tool.to_string(),
            args,
            result: None,
            ok: false,
            error: Some(error),
            duration_ms,
            simulated,
            created_at: now_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_record_shape() {
        let record = AuditRecord::success(
            "s-1",
            "clients.lookup",
            json!({"query": "mara"}),
            json!([{"id": "c-1"}]),
            12,
            false,
        );
        assert!(record.ok);
        assert_eq!(record.tool, "clients.lookup");
        assert_eq!(record.result, Some(json!([{"id": "c-1"}])));
        assert!(record.error.is_none());
        assert!(!record.simulated);
    }

    #[test]
    fn failure_record_shape() {
        let record = AuditRecord::failure(
            "s-1",
            "campaigns.send",
            json!({}),
            "authorization denied".to_string(),
            3,
            true,
        );
        assert!(!record.ok);
        assert!(record.result.is_none());
        assert_eq!(record.error.as_deref(), Some("authorization denied"));
        assert!(record.simulated);
    }

    #[test]
    fn record_serde_roundtrip() {
        let record = AuditRecord::success("s-1", "invoices.report", json!({}), json!(null), 7, false);
        let encoded = serde_json::to_value(&record).unwrap();
        let decoded: AuditRecord = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, record);
    }
}
