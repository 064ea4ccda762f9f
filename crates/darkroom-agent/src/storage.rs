pub mod file;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::AgentResult;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn write(&self, keys: &[&str], data: &Value) -> AgentResult<()>;
    async fn read(&self, keys: &[&str]) -> AgentResult<Option<Value>>;
    async fn list(&self, keys: &[&str]) -> AgentResult<Vec<String>>;
}

pub type SharedStorage = Arc<dyn Storage>;
