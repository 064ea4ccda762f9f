use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{AgentError, AgentResult};
use crate::storage::Storage;

#[derive(Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn build_path(&self, keys: &[&str]) -> AgentResult<PathBuf> {
        if keys.is_empty() {
            return Err(AgentError::InvalidInput("storage keys empty".to_string()));
        }
        let mut path = self.root.clone();
        for key in &keys[..keys.len() - 1] {
            validate_key(key)?;
            path.push(key);
        }
        let mut filename = keys[keys.len() - 1].to_string();
        validate_key(&filename)?;
        if !filename.ends_with(".json") {
            filename.push_str(".json");
        }
        path.push(filename);
        Ok(path)
    }

    fn build_dir_path(&self, keys: &[&str]) -> AgentResult<PathBuf> {
        let mut path = self.root.clone();
        for key in keys {
            validate_key(key)?;
            path.push(key);
        }
        Ok(path)
    }

    async fn ensure_parent_dir(path: &Path) -> AgentResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|error| {
                    AgentError::Internal(format!(
                        "failed to create storage directory {}: {error}",
                        parent.display()
                    ))
                })?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for FileStorage {
    async fn write(&self, keys: &[&str], data: &Value) -> AgentResult<()> {
        let path = self.build_path(keys)?;
        Self::ensure_parent_dir(&path).await?;
        let serialized = serde_json::to_vec_pretty(data)
            .map_err(|error| AgentError::Internal(format!("storage serialize error: {error}")))?;
        tokio::fs::write(&path, serialized)
            .await
            .map_err(|error| {
                AgentError::Internal(format!(
                    "failed to write storage file {}: {error}",
                    path.display()
                ))
            })?;
        Ok(())
    }

    async fn read(&self, keys: &[&str]) -> AgentResult<Option<Value>> {
        let path = self.build_path(keys)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                return Err(AgentError::Internal(format!(
                    "failed to read storage file {}: {error}",
                    path.display()
                )))
            }
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|error| AgentError::Internal(format!("storage parse error: {error}")))?;
        Ok(Some(value))
    }

    async fn list(&self, keys: &[&str]) -> AgentResult<Vec<String>> {
        let path = self.build_dir_path(keys)?;
        let mut entries = match tokio::fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(AgentError::Internal(format!(
                    "failed to list storage directory {}: {error}",
                    path.display()
                )))
            }
        };

        let mut names = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|error| {
                AgentError::Internal(format!(
                    "failed to list storage directory {}: {error}",
                    path.display()
                ))
            })?;
            let Some(entry) = entry else {
                break;
            };
            let name = entry.file_name().to_string_lossy().to_string();
            match name.strip_suffix(".json") {
                Some(stem) => names.push(stem.to_string()),
                None => names.push(name),
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_key(key: &str) -> AgentResult<()> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(AgentError::InvalidInput(format!(
            "invalid storage key {key}"
        )));
    }
    if key.contains('/') || key.contains('\\') {
        return Err(AgentError::InvalidInput(format!(
            "invalid storage key {key}"
        )));
    }
    Ok(())
}
