//! Append-only audit log over the storage seam.

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::audit::record::AuditRecord;
use crate::error::{AgentError, AgentResult};
use crate::storage::SharedStorage;

/// Append-only log of tool invocation records.
///
/// Records live under `["audit", session_id, seq]` with the sequence
/// zero-padded so lexical key order equals insertion order. A write
/// failure surfaces as [`AgentError::AuditWrite`]; it is never dropped.
pub struct AuditLog {
    storage: SharedStorage,
    /// Next seq per session. Sessions absent here rehydrate from
    /// storage on first use, so the log survives restarts.
    counters: Mutex<HashMap<String, u64>>,
}

/// Field filters for [`AuditLog::query`]. Unset fields match anything.
#[derive(Debug, Clone, Default)]
pub struct AuditQuery {
    pub tool: Option<String>,
    pub ok: Option<bool>,
    pub simulated: Option<bool>,
}

impl AuditQuery {
    fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(tool) = &self.tool {
            if &record.tool != tool {
                return false;
            }
        }
        if let Some(ok) = self.ok {
            if record.ok != ok {
                return false;
            }
        }
        if let Some(simulated) = self.simulated {
            if record.simulated != simulated {
                return false;
            }
        }
        true
    }
}

impl AuditLog {
    pub fn new(storage: SharedStorage) -> Self {
        Self {
            storage,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Persist a record, assigning its per-session sequence. Returns the
    /// stored record. Gaps in the sequence are possible if a write fails
    /// after the seq was taken; order, not density, is the guarantee.
    pub async fn record(&self, mut record: AuditRecord) -> AgentResult<AuditRecord> {
        let seq = self.next_seq(&record.session_id).await?;
        record.seq = seq;

        let value = serde_json::to_value(&record).map_err(|error| {
            AgentError::AuditWrite(format!("failed to serialize audit record: {error}"))
        })?;
        self.storage
            .write(&["audit", &record.session_id, &seq_key(seq)], &value)
            .await
            .map_err(|error| AgentError::AuditWrite(error.to_string()))?;
        Ok(record)
    }

    /// Read back a session's records ordered by `(created_at, seq)`,
    /// keeping those the filter matches.
    pub async fn query(&self, session_id: &str, filter: &AuditQuery) -> AgentResult<Vec<AuditRecord>> {
        let mut keys = self.storage.list(&["audit", session_id]).await?;
        keys.sort();

        let mut records = Vec::new();
        for key in keys {
            if let Some(value) = self.storage.read(&["audit", session_id, &key]).await? {
                let record: AuditRecord = serde_json::from_value(value).map_err(|error| {
                    AgentError::Internal(format!("failed to parse audit record: {error}"))
                })?;
                if filter.matches(&record) {
                    records.push(record);
                }
            }
        }
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.seq.cmp(&b.seq)));
        Ok(records)
    }

    /// Re-read a single record by id.
    pub async fn get(&self, session_id: &str, record_id: &str) -> AgentResult<Option<AuditRecord>> {
        let keys = self.storage.list(&["audit", session_id]).await?;
        for key in keys {
            if let Some(value) = self.storage.read(&["audit", session_id, &key]).await? {
                let record: AuditRecord = serde_json::from_value(value).map_err(|error| {
                    AgentError::Internal(format!("failed to parse audit record: {error}"))
                })?;
                if record.id == record_id {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    async fn next_seq(&self, session_id: &str) -> AgentResult<u64> {
        {
            let mut counters = self.counters.lock().await;
            if let Some(counter) = counters.get_mut(session_id) {
                let seq = *counter;
                *counter += 1;
                return Ok(seq);
            }
        }

        // First record for this session since startup. List outside the
        // lock so storage I/O never blocks other sessions' counters.
        let existing = self.storage.list(&["audit", session_id]).await?;
        let next = existing
            .iter()
            .filter_map(|key| key.parse::<u64>().ok())
            .max()
            .map(|max| max.saturating_add(1))
            .unwrap_or(0);

        let mut counters = self.counters.lock().await;
        let counter = counters.entry(session_id.to_string()).or_insert(next);
        let seq = *counter;
        *counter += 1;
        Ok(seq)
    }
}

fn seq_key(seq: u64) -> String {
    format!("{seq:010}")
}
