//! Agent configuration file and environment overrides.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{AgentError, AgentResult};
use crate::utils::time::now_secs;

pub const AGENT_CONFIG_FILENAME: &str = "darkroom.json";
pub const AGENT_CONFIG_VERSION: &str = "1.0.0";

const DEFAULT_MAX_CONCURRENT_TOOLS: usize = 32;
const DEFAULT_TOOL_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub version: String,
    pub studio_id: String,
    pub name: String,
    pub created_at: u64,
    pub last_modified: u64,
    pub execution: ExecutionPreferences,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPreferences {
    /// Global cap on handlers running at once, across all sessions.
    pub max_concurrent_tools: usize,
    /// Time budget for tools that do not declare their own.
    pub default_timeout_ms: u64,
}

impl Default for ExecutionPreferences {
    fn default() -> Self {
        Self {
            max_concurrent_tools: DEFAULT_MAX_CONCURRENT_TOOLS,
            default_timeout_ms: DEFAULT_TOOL_TIMEOUT_MS,
        }
    }
}

impl ExecutionPreferences {
    /// Defaults, overridable through `DARKROOM_MAX_CONCURRENT_TOOLS`
    /// and `DARKROOM_TOOL_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let max_concurrent_tools = env::var("DARKROOM_MAX_CONCURRENT_TOOLS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_TOOLS);
        let default_timeout_ms = env::var("DARKROOM_TOOL_TIMEOUT_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_TOOL_TIMEOUT_MS);

        Self {
            max_concurrent_tools,
            default_timeout_ms,
        }
    }
}

impl AgentConfig {
    pub fn default_new() -> Self {
        let now = now_secs();
        Self {
            version: AGENT_CONFIG_VERSION.to_string(),
            studio_id: Uuid::now_v7().to_string(),
            name: "Default Studio".to_string(),
            created_at: now,
            last_modified: now,
            execution: ExecutionPreferences::from_env(),
        }
    }
}

pub fn load_or_create_agent_config(dir: &Path) -> AgentResult<AgentConfig> {
    std::fs::create_dir_all(dir).map_err(|error| {
        AgentError::Internal(format!(
            "failed to create config directory {}: {error}",
            dir.display()
        ))
    })?;

    let path = agent_config_path(dir);
    if !path.exists() {
        let config = AgentConfig::default_new();
        write_agent_config(&path, &config)?;
        return Ok(config);
    }

    let data = std::fs::read_to_string(&path).map_err(|error| {
        AgentError::Internal(format!(
            "failed to read agent config {}: {error}",
            path.display()
        ))
    })?;
    let mut config: AgentConfig = serde_json::from_str(&data).map_err(|error| {
        AgentError::Internal(format!(
            "failed to parse agent config {}: {error}",
            path.display()
        ))
    })?;

    if config.version != AGENT_CONFIG_VERSION {
        config = migrate_agent_config(config)?;
        write_agent_config(&path, &config)?;
    }

    Ok(config)
}

pub fn migrate_agent_config(config: AgentConfig) -> AgentResult<AgentConfig> {
    Err(AgentError::Internal(format!(
        "no migration from config version {}",
        config.version
    )))
}

pub fn agent_config_path(dir: &Path) -> PathBuf {
    dir.join(AGENT_CONFIG_FILENAME)
}

fn write_agent_config(path: &Path, config: &AgentConfig) -> AgentResult<()> {
    let data = serde_json::to_string_pretty(config).map_err(|error| {
        AgentError::Internal(format!(
            "failed to serialize agent config {}: {error}",
            path.display()
        ))
    })?;
    std::fs::write(path, data).map_err(|error| {
        AgentError::Internal(format!(
            "failed to write agent config {}: {error}",
            path.display()
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_config_when_missing() {
        let dir = tempdir().expect("tempdir");
        let config = load_or_create_agent_config(dir.path()).expect("load/create");

        let path = agent_config_path(dir.path());
        assert!(path.exists());
        assert_eq!(config.version, AGENT_CONFIG_VERSION);
        assert_eq!(config.name, "Default Studio");
        assert!(config.execution.max_concurrent_tools > 0);
        assert!(config.execution.default_timeout_ms > 0);
    }

    #[test]
    fn loads_existing_config() {
        let dir = tempdir().expect("tempdir");
        let original = load_or_create_agent_config(dir.path()).expect("create");
        let loaded = load_or_create_agent_config(dir.path()).expect("load");
        assert_eq!(loaded.studio_id, original.studio_id);
    }

    #[test]
    fn version_mismatch_invokes_migration_stub() {
        let dir = tempdir().expect("tempdir");
        let mut original = AgentConfig::default_new();
        original.version = "0.9.0".to_string();
        write_agent_config(&agent_config_path(dir.path()), &original).expect("write config");

        let err = load_or_create_agent_config(dir.path()).expect_err("expected error");
        assert!(matches!(err, AgentError::Internal(_)));
    }
}
