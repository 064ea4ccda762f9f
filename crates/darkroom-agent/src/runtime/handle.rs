use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio_util::sync::CancellationToken;

use crate::bus::Bus;
use crate::error::{AgentError, AgentResult};
use crate::planner::plan::{FailurePolicy, Plan};
use crate::runtime::actor::SessionRuntimeActor;
use crate::runtime::protocol::{PlanReport, SessionCommand};
use crate::session::store::SessionStore;
use crate::tools::executor::{ExecutionMode, ToolExecutor};

#[derive(Clone)]
pub struct SessionRuntimeHandle {
    session_id: String,
    command_tx: mpsc::UnboundedSender<SessionCommand>,
    cancel: Arc<Mutex<CancellationToken>>,
}

impl SessionRuntimeHandle {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Queue a plan and wait for its report. Plans submitted to one
    /// session run in submission order, one at a time.
    pub async fn run_plan(
        &self,
        plan: Plan,
        policy: FailurePolicy,
        mode: ExecutionMode,
    ) -> AgentResult<PlanReport> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(SessionCommand::RunPlan {
                plan,
                policy,
                mode,
                reply: reply_tx,
            })
            .map_err(|_| AgentError::Internal("session runtime stopped".to_string()))?;
        reply_rx
            .await
            .map_err(|_| AgentError::Internal("session runtime dropped response".to_string()))?
    }

    /// Abort the session's queued work. A step already in flight runs
    /// to completion (its audit record is written); everything queued
    /// behind it is reported as not attempted. Plans submitted after
    /// this call run normally.
    pub async fn abort(&self) -> AgentResult<()> {
        {
            let token = self.cancel.lock().await;
            token.cancel();
        }
        self.command_tx
            .send(SessionCommand::Abort)
            .map_err(|_| AgentError::Internal("session runtime stopped".to_string()))?;
        Ok(())
    }
}

pub fn spawn_session_runtime(
    session_id: String,
    executor: Arc<ToolExecutor>,
    store: Arc<SessionStore>,
    bus: Bus,
) -> SessionRuntimeHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let cancel = Arc::new(Mutex::new(CancellationToken::new()));
    tracing::info!("session runtime started for {session_id}");

    let actor = SessionRuntimeActor::new(
        session_id.clone(),
        executor,
        store,
        bus,
        command_rx,
        cancel.clone(),
    );
    tokio::spawn(async move {
        actor.run().await;
    });

    SessionRuntimeHandle {
        session_id,
        command_tx,
        cancel,
    }
}
