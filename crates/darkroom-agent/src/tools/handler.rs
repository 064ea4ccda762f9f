//! Tool handler trait and the built-in handler kinds.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::json;

use crate::error::AgentResult;

/// Boxed async closure over JSON arguments.
pub type HandlerFn =
    Arc<dyn Fn(serde_json::Value) -> BoxFuture<'static, AgentResult<serde_json::Value>> + Send + Sync>;

/// Executable behavior behind a tool definition.
///
/// `invoke` runs the tool for real. `simulate` is what shadow execution
/// calls instead of `invoke` for tools with side effects; the default
/// returns a placeholder without touching anything.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, args: serde_json::Value) -> AgentResult<serde_json::Value>;

    async fn simulate(&self, args: serde_json::Value) -> AgentResult<serde_json::Value> {
        let _ = args;
        Ok(json!({"simulated": true}))
    }
}

/// Read-only handler. Safe to run for real even in shadow mode, so
/// `simulate` delegates to `invoke`.
pub struct QueryTool {
    run: HandlerFn,
}

impl QueryTool {
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AgentResult<serde_json::Value>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |args| Box::pin(run(args))),
        }
    }
}

#[async_trait]
impl ToolHandler for QueryTool {
    async fn invoke(&self, args: serde_json::Value) -> AgentResult<serde_json::Value> {
        (self.run)(args).await
    }

    async fn simulate(&self, args: serde_json::Value) -> AgentResult<serde_json::Value> {
        self.invoke(args).await
    }
}

/// Handler that mutates studio state. Shadow execution never calls
/// `invoke` on these.
pub struct MutationTool {
    run: HandlerFn,
}

impl MutationTool {
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AgentResult<serde_json::Value>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |args| Box::pin(run(args))),
        }
    }
}

#[async_trait]
impl ToolHandler for MutationTool {
    async fn invoke(&self, args: serde_json::Value) -> AgentResult<serde_json::Value> {
        (self.run)(args).await
    }
}

/// Handler that reaches outside the studio (mail, publishing).
/// Indistinguishable from `MutationTool` at runtime today; kept as a
/// separate kind so call sites document what a tool touches.
pub struct ExternalCallTool {
    run: HandlerFn,
}

impl ExternalCallTool {
    pub fn new<F, Fut>(run: F) -> Self
    where
        F: Fn(serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = AgentResult<serde_json::Value>> + Send + 'static,
    {
        Self {
            run: Arc::new(move |args| Box::pin(run(args))),
        }
    }
}

#[async_trait]
impl ToolHandler for ExternalCallTool {
    async fn invoke(&self, args: serde_json::Value) -> AgentResult<serde_json::Value> {
        (self.run)(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;

    #[tokio::test]
    async fn query_tool_invokes_closure() {
        let tool = QueryTool::new(|args| async move {
            let name = args["name"].as_str().unwrap_or("nobody").to_string();
            Ok(json!({"greeting": format!("hello {name}")}))
        });

        let out = tool.invoke(json!({"name": "mara"})).await.unwrap();
        assert_eq!(out["greeting"], "hello mara");
    }

    #[tokio::test]
    async fn query_tool_simulate_runs_for_real() {
        let tool = QueryTool::new(|_args| async { Ok(json!({"rows": 3})) });
        let out = tool.simulate(json!({})).await.unwrap();
        assert_eq!(out["rows"], 3);
    }

    #[tokio::test]
    async fn mutation_tool_simulate_is_a_placeholder() {
        let tool = MutationTool::new(|_args| async { Ok(json!({"invoice_id": "inv-1"})) });

        let real = tool.invoke(json!({})).await.unwrap();
        assert_eq!(real["invoice_id"], "inv-1");

        let shadow = tool.simulate(json!({})).await.unwrap();
        assert_eq!(shadow, json!({"simulated": true}));
    }

    #[tokio::test]
    async fn external_call_tool_simulate_is_a_placeholder() {
        let tool = ExternalCallTool::new(|_args| async { Ok(json!({"enqueued": 120})) });
        let shadow = tool.simulate(json!({})).await.unwrap();
        assert_eq!(shadow, json!({"simulated": true}));
    }

    #[tokio::test]
    async fn handler_errors_pass_through() {
        let tool = QueryTool::new(|_args| async {
            Err(AgentError::HandlerFailed("backend unavailable".to_string()))
        });
        let err = tool.invoke(json!({})).await.expect_err("should fail");
        assert!(matches!(err, AgentError::HandlerFailed(_)));
    }
}
