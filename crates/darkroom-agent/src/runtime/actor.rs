use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::bus::Bus;
use crate::error::{AgentError, AgentResult};
use crate::event::{AgentEvent, AuditWriteFailedPayload, ToolExecutedPayload};
use crate::planner::plan::{FailurePolicy, Plan};
use crate::runtime::protocol::{PlanReport, SessionCommand, StepOutcome, StepStatus};
use crate::session::message::{Message, MessageRole};
use crate::session::store::SessionStore;
use crate::tools::executor::{ExecutionMode, ToolExecutor};

/// One actor per session. Draining its queue in order is what gives a
/// session its strict step ordering; sessions never share an actor.
pub(crate) struct SessionRuntimeActor {
    session_id: String,
    executor: Arc<ToolExecutor>,
    store: Arc<SessionStore>,
    bus: Bus,
    command_rx: mpsc::UnboundedReceiver<SessionCommand>,
    /// Shared with the handle; `abort` cancels the current token from
    /// outside while a plan is mid-flight.
    cancel: Arc<Mutex<CancellationToken>>,
    /// Set after an audit write failure. The session stops accepting
    /// plans; execution without a trail is worse than no execution.
    audit_halted: bool,
}

impl SessionRuntimeActor {
    pub(crate) fn new(
        session_id: String,
        executor: Arc<ToolExecutor>,
        store: Arc<SessionStore>,
        bus: Bus,
        command_rx: mpsc::UnboundedReceiver<SessionCommand>,
        cancel: Arc<Mutex<CancellationToken>>,
    ) -> Self {
        Self {
            session_id,
            executor,
            store,
            bus,
            command_rx,
            cancel,
            audit_halted: false,
        }
    }

    pub(crate) async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            match command {
                SessionCommand::RunPlan {
                    plan,
                    policy,
                    mode,
                    reply,
                } => {
                    let result = self.run_plan(plan, policy, mode).await;
                    let _ = reply.send(result);
                }
                SessionCommand::Abort => {
                    let mut slot = self.cancel.lock().await;
                    *slot = CancellationToken::new();
                }
            }
        }
        tracing::info!("session runtime stopped for {}", self.session_id);
    }

    async fn run_plan(
        &mut self,
        plan: Plan,
        policy: FailurePolicy,
        mode: ExecutionMode,
    ) -> AgentResult<PlanReport> {
        if self.audit_halted {
            return Err(AgentError::AuditWrite(format!(
                "session {} halted after an audit write failure",
                self.session_id
            )));
        }

        // Fresh read so mid-session escalations apply to later plans.
        let session = self.store.get(&self.session_id).await?;
        let token = { self.cancel.lock().await.clone() };

        let mut steps = Vec::with_capacity(plan.steps.len());
        let mut halted = false;
        for step in plan.steps {
            if halted || token.is_cancelled() {
                steps.push(StepOutcome::not_attempted(&step.tool));
                continue;
            }

            let outcome = match self.executor.execute(&session, &step.tool, step.args, mode).await
            {
                Ok(outcome) => outcome,
                Err(error) => {
                    self.audit_halted = true;
                    tracing::warn!(
                        "audit write failed in session {}: {}",
                        self.session_id,
                        error
                    );
                    let _ = self.bus.publish(AgentEvent::AuditWriteFailed(
                        AuditWriteFailedPayload {
                            session_id: self.session_id.clone(),
                            message: error.to_string(),
                        },
                    ));
                    return Err(error);
                }
            };

            let _ = self.bus.publish(AgentEvent::ToolExecuted(ToolExecutedPayload {
                session_id: self.session_id.clone(),
                audit_id: outcome.record.id.clone(),
                tool: outcome.record.tool.clone(),
                ok: outcome.record.ok,
                simulated: outcome.record.simulated,
                error: outcome.record.error.clone(),
            }));

            self.append_tool_message(&outcome.record.id, &outcome).await;

            match outcome.failure {
                None => steps.push(StepOutcome {
                    tool: step.tool,
                    status: StepStatus::Succeeded,
                    audit_id: Some(outcome.record.id),
                    error: None,
                }),
                Some(failure) => {
                    steps.push(StepOutcome {
                        tool: step.tool,
                        status: StepStatus::Failed,
                        audit_id: Some(outcome.record.id),
                        error: Some(failure.to_string()),
                    });
                    if policy == FailurePolicy::AbortOnFirstFailure {
                        halted = true;
                    }
                }
            }
        }

        Ok(PlanReport {
            session_id: self.session_id.clone(),
            steps,
        })
    }

    /// Mirror the step into the transcript. A transcript write failure
    /// is logged, not escalated; the audit record already exists.
    async fn append_tool_message(
        &self,
        audit_id: &str,
        outcome: &crate::tools::executor::ExecutionOutcome,
    ) {
        let content = match (&outcome.record.result, &outcome.record.error) {
            (Some(result), _) => result.to_string(),
            (None, Some(error)) => error.clone(),
            (None, None) => String::new(),
        };
        let message = Message::new(&self.session_id, MessageRole::Tool, content)
            .with_tool_call_id(audit_id);
        if let Err(error) = self.store.append(&self.session_id, message).await {
            tracing::warn!(
                "failed to append tool message for {} in session {}: {}",
                audit_id,
                self.session_id,
                error
            );
        }
    }
}
