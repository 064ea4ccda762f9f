//! Gated, audited tool invocation.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::audit::{AuditLog, AuditRecord};
use crate::error::{AgentError, AgentResult};
use crate::permissions::gate::{authorize, GateDecision};
use crate::session::store::Session;
use crate::tools::registry::ToolRegistry;
use crate::tools::schema::RiskLevel;

/// Whether handlers run for real or through their dry-run path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    Live,
    /// Medium and high risk handlers are simulated instead of invoked.
    /// Every record written in this mode is marked `simulated`.
    Shadow,
}

/// What a single invocation attempt produced. `record` is already
/// persisted by the time the caller sees it; `failure` carries the
/// expected failure (unknown tool, bad args, denial, handler error,
/// timeout) when the attempt did not succeed.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub record: AuditRecord,
    pub failure: Option<AgentError>,
}

impl ExecutionOutcome {
    pub fn ok(&self) -> bool {
        self.failure.is_none()
    }
}

/// Runs tools through the full pipeline: resolve, validate, authorize,
/// invoke. Every attempt writes exactly one audit record before the
/// call returns, whatever the path taken; the only error `execute`
/// itself returns is [`AgentError::AuditWrite`].
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    audit: Arc<AuditLog>,
    /// Global cap on concurrently running handlers, across sessions.
    permits: Arc<Semaphore>,
    default_timeout_ms: u64,
}

impl ToolExecutor {
    pub fn new(
        registry: Arc<ToolRegistry>,
        audit: Arc<AuditLog>,
        permits: Arc<Semaphore>,
        default_timeout_ms: u64,
    ) -> Self {
        Self {
            registry,
            audit,
            permits,
            default_timeout_ms,
        }
    }

    pub async fn execute(
        &self,
        session: &Session,
        tool_name: &str,
        args: Value,
        mode: ExecutionMode,
    ) -> AgentResult<ExecutionOutcome> {
        let started = Instant::now();
        let simulated = mode == ExecutionMode::Shadow;

        let tool = match self.registry.find(tool_name) {
            Some(tool) => tool,
            None => {
                let failure = AgentError::UnknownTool(tool_name.to_string());
                return self
                    .finish_failure(session, tool_name, args, failure, started, simulated)
                    .await;
            }
        };

        if let Err(failure) = tool.validate_args(&args) {
            return self
                .finish_failure(session, tool_name, args, failure, started, simulated)
                .await;
        }

        if let GateDecision::Denied {
            missing_scopes,
            reason,
        } = authorize(session, tool)
        {
            let failure = AgentError::AuthorizationDenied {
                missing_scopes,
                reason,
            };
            return self
                .finish_failure(session, tool_name, args, failure, started, simulated)
                .await;
        }

        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                let failure = AgentError::Internal("tool permits closed".to_string());
                return self
                    .finish_failure(session, tool_name, args, failure, started, simulated)
                    .await;
            }
        };

        let budget = tool.timeout_ms.unwrap_or(self.default_timeout_ms);
        let dry_run = simulated && tool.risk != RiskLevel::Low;
        let handler = tool.handler.clone();
        let handler_args = args.clone();
        let invocation = async move {
            if dry_run {
                handler.simulate(handler_args).await
            } else {
                handler.invoke(handler_args).await
            }
        };

        let result = tokio::time::timeout(Duration::from_millis(budget), invocation).await;
        drop(permit);

        match result {
            Ok(Ok(value)) => {
                let duration_ms = elapsed_ms(started);
                let record = self
                    .audit
                    .record(AuditRecord::success(
                        &session.id,
                        tool_name,
                        args,
                        value,
                        duration_ms,
                        simulated,
                    ))
                    .await?;
                Ok(ExecutionOutcome {
                    record,
                    failure: None,
                })
            }
            Ok(Err(error)) => {
                tracing::warn!("tool {} failed in session {}: {}", tool_name, session.id, error);
                let failure = match error {
                    AgentError::HandlerFailed(message) => AgentError::HandlerFailed(message),
                    other => AgentError::HandlerFailed(other.to_string()),
                };
                self.finish_failure(session, tool_name, args, failure, started, simulated)
                    .await
            }
            Err(_) => {
                tracing::warn!(
                    "tool {} timed out after {}ms in session {}",
                    tool_name,
                    budget,
                    session.id
                );
                let failure = AgentError::Timeout {
                    tool: tool_name.to_string(),
                    timeout_ms: budget,
                };
                self.finish_failure(session, tool_name, args, failure, started, simulated)
                    .await
            }
        }
    }

    async fn finish_failure(
        &self,
        session: &Session,
        tool_name: &str,
        args: Value,
        failure: AgentError,
        started: Instant,
        simulated: bool,
    ) -> AgentResult<ExecutionOutcome> {
        let record = self
            .audit
            .record(AuditRecord::failure(
                &session.id,
                tool_name,
                args,
                failure.to_string(),
                elapsed_ms(started),
                simulated,
            ))
            .await?;
        Ok(ExecutionOutcome {
            record,
            failure: Some(failure),
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditQuery;
    use crate::permissions::scopes::{scope_set, SessionMode};
    use crate::session::store::SessionOwner;
    use crate::storage::memory::MemoryStorage;
    use crate::storage::{SharedStorage, Storage};
    use crate::tools::handler::{MutationTool, QueryTool};
    use crate::tools::schema::ToolDefinition;
    use crate::utils::time::now_secs;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn make_session(mode: SessionMode, scopes: &[&str]) -> Session {
        Session {
            id: "s-1".to_string(),
            owner: SessionOwner {
                user_id: "user-1".to_string(),
                studio_id: "studio-1".to_string(),
            },
            mode,
            scopes: scope_set(scopes),
            created_at: now_secs(),
            updated_at: now_secs(),
        }
    }

    fn make_executor(registry: ToolRegistry) -> (ToolExecutor, Arc<AuditLog>) {
        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let audit = Arc::new(AuditLog::new(storage));
        let executor = ToolExecutor::new(
            Arc::new(registry),
            audit.clone(),
            Arc::new(Semaphore::new(8)),
            5_000,
        );
        (executor, audit)
    }

    async fn record_count(audit: &AuditLog, session_id: &str) -> usize {
        audit
            .query(session_id, &AuditQuery::default())
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn success_records_result() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "clients.lookup",
                    RiskLevel::Low,
                    Arc::new(QueryTool::new(|_args| async { Ok(json!([{"id": "c-1"}])) })),
                )
                .with_scopes(scope_set(&["clients.read"])),
            )
            .unwrap();
        let (executor, audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadOnly, &["clients.read"]);

        let outcome = executor
            .execute(&session, "clients.lookup", json!({"query": "mara"}), ExecutionMode::Live)
            .await
            .unwrap();

        assert!(outcome.ok());
        assert!(outcome.record.ok);
        assert_eq!(outcome.record.result, Some(json!([{"id": "c-1"}])));
        assert!(!outcome.record.simulated);
        assert_eq!(record_count(&audit, &session.id).await, 1);
    }

    #[tokio::test]
    async fn unknown_tool_still_audited() {
        let (executor, audit) = make_executor(ToolRegistry::new());
        let session = make_session(SessionMode::ReadWrite, &[]);

        let outcome = executor
            .execute(&session, "galleries.retouch", json!({}), ExecutionMode::Live)
            .await
            .unwrap();

        assert!(matches!(outcome.failure, Some(AgentError::UnknownTool(_))));
        assert!(!outcome.record.ok);
        // The record keeps the requested name for forensics.
        assert_eq!(outcome.record.tool, "galleries.retouch");
        assert_eq!(record_count(&audit, &session.id).await, 1);
    }

    #[tokio::test]
    async fn invalid_args_skip_the_handler() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();

        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "invoices.issue",
                    RiskLevel::Medium,
                    Arc::new(MutationTool::new(move |_args| {
                        let counter = counter.clone();
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(json!({"invoice_id": "inv-1"}))
                        }
                    })),
                )
                .with_scopes(scope_set(&["invoices.write"]))
                .with_input_schema(json!({"type": "object", "required": ["client_id"]})),
            )
            .unwrap();
        let (executor, audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadWrite, &["invoices.write"]);

        let outcome = executor
            .execute(&session, "invoices.issue", json!({}), ExecutionMode::Live)
            .await
            .unwrap();

        assert!(matches!(outcome.failure, Some(AgentError::InvalidArguments(_))));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(record_count(&audit, &session.id).await, 1);
    }

    #[tokio::test]
    async fn denial_names_missing_scopes_and_skips_handler() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();

        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "vouchers.issue",
                    RiskLevel::Medium,
                    Arc::new(MutationTool::new(move |_args| {
                        let counter = counter.clone();
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(json!({"code": "DR-XYZ"}))
                        }
                    })),
                )
                .with_scopes(scope_set(&["vouchers.write"])),
            )
            .unwrap();
        let (executor, audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadWrite, &["clients.read"]);

        let outcome = executor
            .execute(&session, "vouchers.issue", json!({}), ExecutionMode::Live)
            .await
            .unwrap();

        match outcome.failure {
            Some(AgentError::AuthorizationDenied { missing_scopes, .. }) => {
                assert_eq!(missing_scopes.len(), 1);
                assert_eq!(missing_scopes[0].as_str(), "vouchers.write");
            }
            other => panic!("expected denial, got {other:?}"),
        }
        assert!(!outcome.record.ok);
        assert!(outcome.record.error.as_deref().unwrap_or("").contains("vouchers.write"));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
        assert_eq!(record_count(&audit, &session.id).await, 1);
    }

    #[tokio::test]
    async fn high_risk_needs_read_write_mode() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "campaigns.send",
                    RiskLevel::High,
                    Arc::new(QueryTool::new(|_args| async { Ok(json!({"enqueued": 42})) })),
                )
                .with_scopes(scope_set(&["campaigns.send"])),
            )
            .unwrap();
        let (executor, _audit) = make_executor(registry);

        let read_only = make_session(SessionMode::ReadOnly, &["campaigns.send"]);
        let denied = executor
            .execute(&read_only, "campaigns.send", json!({}), ExecutionMode::Live)
            .await
            .unwrap();
        assert!(matches!(
            denied.failure,
            Some(AgentError::AuthorizationDenied { .. })
        ));

        let read_write = make_session(SessionMode::ReadWrite, &["campaigns.send"]);
        let allowed = executor
            .execute(&read_write, "campaigns.send", json!({}), ExecutionMode::Live)
            .await
            .unwrap();
        assert!(allowed.ok());
    }

    #[tokio::test]
    async fn handler_failure_is_caught_not_fatal() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "galleries.publish",
                RiskLevel::Low,
                Arc::new(QueryTool::new(|_args| async {
                    Err(AgentError::HandlerFailed("gallery host unreachable".to_string()))
                })),
            ))
            .unwrap();
        let (executor, audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadWrite, &[]);

        let outcome = executor
            .execute(&session, "galleries.publish", json!({}), ExecutionMode::Live)
            .await
            .unwrap();

        assert!(matches!(outcome.failure, Some(AgentError::HandlerFailed(_))));
        assert!(outcome
            .record
            .error
            .as_deref()
            .unwrap_or("")
            .contains("gallery host unreachable"));
        assert_eq!(record_count(&audit, &session.id).await, 1);
    }

    #[tokio::test]
    async fn timeout_reports_effect_unknown() {
        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "invoices.report",
                    RiskLevel::Low,
                    Arc::new(QueryTool::new(|_args| async {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        Ok(json!({}))
                    })),
                )
                .with_timeout_ms(50),
            )
            .unwrap();
        let (executor, audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadOnly, &[]);

        let outcome = executor
            .execute(&session, "invoices.report", json!({}), ExecutionMode::Live)
            .await
            .unwrap();

        match outcome.failure {
            Some(AgentError::Timeout { timeout_ms, .. }) => assert_eq!(timeout_ms, 50),
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(outcome
            .record
            .error
            .as_deref()
            .unwrap_or("")
            .contains("effect unknown"));
        assert_eq!(record_count(&audit, &session.id).await, 1);
    }

    #[tokio::test]
    async fn shadow_mode_simulates_mutations() {
        let invocations = Arc::new(AtomicUsize::new(0));
        let counter = invocations.clone();

        let mut registry = ToolRegistry::new();
        registry
            .register(
                ToolDefinition::new(
                    "vouchers.redeem",
                    RiskLevel::Medium,
                    Arc::new(MutationTool::new(move |_args| {
                        let counter = counter.clone();
                        async move {
                            counter.fetch_add(1, Ordering::SeqCst);
                            Ok(json!({"redeemed": true}))
                        }
                    })),
                )
                .with_scopes(scope_set(&["vouchers.write"])),
            )
            .unwrap();
        let (executor, _audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadWrite, &["vouchers.write"]);

        let outcome = executor
            .execute(&session, "vouchers.redeem", json!({}), ExecutionMode::Shadow)
            .await
            .unwrap();

        assert!(outcome.ok());
        assert!(outcome.record.simulated);
        assert_eq!(outcome.record.result, Some(json!({"simulated": true})));
        assert_eq!(invocations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn shadow_mode_runs_low_risk_for_real() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "clients.lookup",
                RiskLevel::Low,
                Arc::new(QueryTool::new(|_args| async { Ok(json!([{"id": "c-9"}])) })),
            ))
            .unwrap();
        let (executor, _audit) = make_executor(registry);
        let session = make_session(SessionMode::ReadOnly, &[]);

        let outcome = executor
            .execute(&session, "clients.lookup", json!({}), ExecutionMode::Shadow)
            .await
            .unwrap();

        assert!(outcome.ok());
        // The real result comes back, but the record still carries the mode.
        assert_eq!(outcome.record.result, Some(json!([{"id": "c-9"}])));
        assert!(outcome.record.simulated);
    }

    #[tokio::test]
    async fn permits_bound_concurrent_handlers() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let running_in = running.clone();
        let peak_in = peak.clone();

        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "invoices.report",
                RiskLevel::Low,
                Arc::new(QueryTool::new(move |_args| {
                    let running = running_in.clone();
                    let peak = peak_in.clone();
                    async move {
                        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        running.fetch_sub(1, Ordering::SeqCst);
                        Ok(json!({}))
                    }
                })),
            ))
            .unwrap();

        let storage: SharedStorage = Arc::new(MemoryStorage::new());
        let audit = Arc::new(AuditLog::new(storage));
        let executor = Arc::new(ToolExecutor::new(
            Arc::new(registry),
            audit,
            Arc::new(Semaphore::new(1)),
            5_000,
        ));
        let session = make_session(SessionMode::ReadOnly, &[]);

        let mut handles = Vec::new();
        for _ in 0..3 {
            let executor = executor.clone();
            let session = session.clone();
            handles.push(tokio::spawn(async move {
                executor
                    .execute(&session, "invoices.report", json!({}), ExecutionMode::Live)
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().ok());
        }

        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    struct FailingStorage;

    #[async_trait]
    impl Storage for FailingStorage {
        async fn write(&self, _keys: &[&str], _data: &Value) -> AgentResult<()> {
            Err(AgentError::Internal("disk full".to_string()))
        }

        async fn read(&self, _keys: &[&str]) -> AgentResult<Option<Value>> {
            Ok(None)
        }

        async fn list(&self, _keys: &[&str]) -> AgentResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn audit_write_failure_is_the_only_hard_error() {
        let mut registry = ToolRegistry::new();
        registry
            .register(ToolDefinition::new(
                "clients.lookup",
                RiskLevel::Low,
                Arc::new(QueryTool::new(|_args| async { Ok(json!([])) })),
            ))
            .unwrap();

        let audit = Arc::new(AuditLog::new(Arc::new(FailingStorage)));
        let executor = ToolExecutor::new(
            Arc::new(registry),
            audit,
            Arc::new(Semaphore::new(4)),
            5_000,
        );
        let session = make_session(SessionMode::ReadOnly, &[]);

        let err = executor
            .execute(&session, "clients.lookup", json!({}), ExecutionMode::Live)
            .await
            .expect_err("audit write must surface");
        assert!(matches!(err, AgentError::AuditWrite(_)));
    }
}
