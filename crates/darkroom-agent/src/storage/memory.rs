use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{AgentError, AgentResult};
use crate::storage::Storage;

/// In-memory storage backend for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<Vec<String>, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn owned_keys(keys: &[&str]) -> AgentResult<Vec<String>> {
    if keys.is_empty() {
        return Err(AgentError::InvalidInput("storage keys empty".to_string()));
    }
    for key in keys {
        if key.is_empty() {
            return Err(AgentError::InvalidInput("invalid storage key".to_string()));
        }
    }
    Ok(keys.iter().map(|key| key.to_string()).collect())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> AgentResult<()> {
        let keys = owned_keys(keys)?;
        self.entries.write().await.insert(keys, data.clone());
        Ok(())
    }

    async fn read(&self, keys: &[&str]) -> AgentResult<Option<Value>> {
        let keys = owned_keys(keys)?;
        Ok(self.entries.read().await.get(&keys).cloned())
    }

    async fn list(&self, keys: &[&str]) -> AgentResult<Vec<String>> {
        let prefix: Vec<String> = keys.iter().map(|key| key.to_string()).collect();
        let entries = self.entries.read().await;
        let mut names: Vec<String> = entries
            .keys()
            .filter(|stored| stored.len() == prefix.len() + 1 && stored.starts_with(&prefix))
            .filter_map(|stored| stored.last().cloned())
            .collect();
        names.dedup();
        Ok(names)
    }
}
