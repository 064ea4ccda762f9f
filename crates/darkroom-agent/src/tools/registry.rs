//! Tool registry: the catalog of everything the agent may run.

use std::collections::BTreeMap;

use crate::error::{AgentError, AgentResult};
use crate::permissions::scopes::Scope;
use crate::tools::schema::{RiskLevel, ToolDefinition};

/// Registry of tool definitions keyed by name.
///
/// Registration is append-only and rejects duplicates outright; a
/// second tool under an existing name is a wiring bug, not something
/// to paper over at runtime.
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDefinition>,
}

/// Aggregate counts over the registered catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryStats {
    pub total: usize,
    pub by_risk: BTreeMap<RiskLevel, usize>,
    /// A tool requiring several scopes counts once under each.
    pub by_scope: BTreeMap<Scope, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool. Fails with [`AgentError::DuplicateTool`] if the
    /// name is already taken; the registry is left unchanged.
    pub fn register(&mut self, tool: ToolDefinition) -> AgentResult<()> {
        if self.tools.contains_key(&tool.name) {
            return Err(AgentError::DuplicateTool(tool.name.clone()));
        }
        self.tools.insert(tool.name.clone(), tool);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.get(name)
    }

    /// Look up a tool, failing with [`AgentError::UnknownTool`] when absent.
    pub fn get(&self, name: &str) -> AgentResult<&ToolDefinition> {
        self.find(name)
            .ok_or_else(|| AgentError::UnknownTool(name.to_string()))
    }

    /// Iterate registered tool names in sorted order. The iterator
    /// borrows the registry; call again for a fresh pass.
    pub fn list(&self) -> impl Iterator<Item = &str> + '_ {
        self.tools.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn stats(&self) -> RegistryStats {
        let mut by_risk = BTreeMap::new();
        let mut by_scope = BTreeMap::new();
        for tool in self.tools.values() {
            *by_risk.entry(tool.risk).or_insert(0) += 1;
            for scope in &tool.required_scopes {
                *by_scope.entry(scope.clone()).or_insert(0) += 1;
            }
        }
        RegistryStats {
            total: self.tools.len(),
            by_risk,
            by_scope,
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
