//! Side-by-side runs of a legacy and a current planner over one goal.

use std::sync::Arc;

use futures_util::future::join;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bus::Bus;
use crate::error::{AgentError, AgentResult};
use crate::event::{AgentEvent, ShadowComparedPayload};
use crate::planner::planner::Planner;
use crate::planner::types::PlanRequest;
use crate::runtime::protocol::{PlanReport, StepOutcome, StepStatus};
use crate::session::store::{Session, SessionStore};
use crate::shadow::policy::{EquivalencePolicy, GrossOutcome, ShadowRun};
use crate::storage::SharedStorage;
use crate::tools::executor::{ExecutionMode, ToolExecutor};
use crate::utils::time::now_rfc3339;

/// A named planner bound to the execution mode its steps run under.
pub struct ShadowRunner {
    name: String,
    planner: Arc<dyn Planner>,
    mode: ExecutionMode,
}

impl ShadowRunner {
    /// The implementation being retired. Pinned to shadow mode: its
    /// steps still go through the full pipeline and audit trail, but
    /// anything above low risk is simulated instead of invoked.
    pub fn legacy(planner: Arc<dyn Planner>) -> Self {
        Self {
            name: format!("legacy:{}", planner.name()),
            planner,
            mode: ExecutionMode::Shadow,
        }
    }

    /// The implementation of record; its steps run live.
    pub fn current(planner: Arc<dyn Planner>) -> Self {
        Self {
            name: format!("current:{}", planner.name()),
            planner,
            mode: ExecutionMode::Live,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

/// Persisted summary of one side of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunnerOutcome {
    pub runner: String,
    pub ok: bool,
    pub steps_total: usize,
    pub steps_failed: usize,
    pub error: Option<String>,
}

impl RunnerOutcome {
    fn from_run(run: &ShadowRun) -> Self {
        let (steps_total, steps_failed) = match &run.report {
            Some(report) => (
                report.steps.len(),
                report
                    .steps
                    .iter()
                    .filter(|step| step.status != StepStatus::Succeeded)
                    .count(),
            ),
            None => (0, 0),
        };
        Self {
            runner: run.runner.clone(),
            ok: run.ok(),
            steps_total,
            steps_failed,
            error: run.error.clone(),
        }
    }
}

/// The judgment for one comparison, stored under the session it ran in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShadowVerdict {
    pub id: String,
    pub session_id: String,
    pub goal: String,
    pub policy: String,
    pub equivalent: bool,
    pub legacy: RunnerOutcome,
    pub current: RunnerOutcome,
    pub created_at: String,
}

/// Runs two planner implementations against the same request and
/// records whether they behaved equivalently. Judges with
/// [`GrossOutcome`] unless another policy is supplied.
pub struct ShadowComparator {
    executor: Arc<ToolExecutor>,
    store: Arc<SessionStore>,
    storage: SharedStorage,
    bus: Bus,
    policy: Arc<dyn EquivalencePolicy>,
}

impl ShadowComparator {
    pub fn new(
        executor: Arc<ToolExecutor>,
        store: Arc<SessionStore>,
        storage: SharedStorage,
        bus: Bus,
    ) -> Self {
        Self {
            executor,
            store,
            storage,
            bus,
            policy: Arc::new(GrossOutcome),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn EquivalencePolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Plan and execute both sides concurrently, judge them, persist
    /// the verdict, and announce it. Both sides audit every attempted
    /// step like any other execution; the legacy side's records carry
    /// the simulated flag.
    pub async fn compare(
        &self,
        session_id: &str,
        request: &PlanRequest,
        legacy: &ShadowRunner,
        current: &ShadowRunner,
    ) -> AgentResult<ShadowVerdict> {
        let session = self.store.get(session_id).await?;

        let (legacy_run, current_run) = join(
            self.run_side(&session, request, legacy),
            self.run_side(&session, request, current),
        )
        .await;

        let verdict = ShadowVerdict {
            id: Uuid::now_v7().to_string(),
            session_id: session.id.clone(),
            goal: request.goal.clone(),
            policy: self.policy.name().to_string(),
            equivalent: self.policy.equivalent(&legacy_run, &current_run),
            legacy: RunnerOutcome::from_run(&legacy_run),
            current: RunnerOutcome::from_run(&current_run),
            created_at: now_rfc3339(),
        };

        let value = serde_json::to_value(&verdict).map_err(|error| {
            AgentError::Internal(format!("failed to serialize shadow verdict: {error}"))
        })?;
        self.storage
            .write(&["shadow", &verdict.session_id, &verdict.id], &value)
            .await?;

        let _ = self
            .bus
            .publish(AgentEvent::ShadowCompared(ShadowComparedPayload {
                session_id: verdict.session_id.clone(),
                comparison_id: verdict.id.clone(),
                equivalent: verdict.equivalent,
            }));

        Ok(verdict)
    }

    /// Past verdicts for a session, oldest first.
    pub async fn verdicts(&self, session_id: &str) -> AgentResult<Vec<ShadowVerdict>> {
        let keys = self.storage.list(&["shadow", session_id]).await?;

        let mut verdicts = Vec::new();
        for key in keys {
            if let Some(value) = self.storage.read(&["shadow", session_id, &key]).await? {
                let verdict: ShadowVerdict = serde_json::from_value(value).map_err(|error| {
                    AgentError::Internal(format!("failed to parse shadow verdict: {error}"))
                })?;
                verdicts.push(verdict);
            }
        }
        verdicts.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(verdicts)
    }

    /// One side of a comparison: plan, then run every step in the
    /// runner's mode. Steps keep going past expected failures so both
    /// sides show their full shape; only an audit write failure cuts a
    /// side short.
    async fn run_side(
        &self,
        session: &Session,
        request: &PlanRequest,
        runner: &ShadowRunner,
    ) -> ShadowRun {
        let plan = match runner.planner.plan(request).await {
            Ok(plan) => plan,
            Err(error) => {
                tracing::warn!("shadow runner {} failed to plan: {}", runner.name, error);
                return ShadowRun {
                    runner: runner.name.clone(),
                    report: None,
                    error: Some(error.to_string()),
                };
            }
        };

        let mut steps = Vec::with_capacity(plan.steps.len());
        for step in plan.steps {
            let outcome = match self
                .executor
                .execute(session, &step.tool, step.args, runner.mode)
                .await
            {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::warn!("shadow runner {} stopped: {}", runner.name, error);
                    return ShadowRun {
                        runner: runner.name.clone(),
                        report: None,
                        error: Some(error.to_string()),
                    };
                }
            };

            let status = if outcome.failure.is_none() {
                StepStatus::Succeeded
            } else {
                StepStatus::Failed
            };
            steps.push(StepOutcome {
                tool: outcome.record.tool.clone(),
                status,
                audit_id: Some(outcome.record.id),
                error: outcome.failure.map(|failure| failure.to_string()),
            });
        }

        ShadowRun {
            runner: runner.name.clone(),
            report: Some(PlanReport {
                session_id: session.id.clone(),
                steps,
            }),
            error: None,
        }
    }
}
