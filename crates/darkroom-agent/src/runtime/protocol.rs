use tokio::sync::oneshot;

use crate::error::AgentResult;
use crate::planner::plan::{FailurePolicy, Plan};
use crate::tools::executor::ExecutionMode;

/// Commands accepted by a session's runtime actor, processed strictly
/// in submission order.
pub enum SessionCommand {
    RunPlan {
        plan: Plan,
        policy: FailurePolicy,
        mode: ExecutionMode,
        reply: oneshot::Sender<AgentResult<PlanReport>>,
    },
    /// Boundary marker: everything queued before it was covered by the
    /// cancelled token; the actor arms a fresh token when it sees this.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Succeeded,
    Failed,
    /// Skipped: an earlier failure under abort-on-first-failure, or the
    /// session was aborted. No handler ran, no audit record exists.
    NotAttempted,
}

/// Result of one plan step. `audit_id` is set for every attempted step,
/// success or failure.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub tool: String,
    pub status: StepStatus,
    pub audit_id: Option<String>,
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn not_attempted(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            status: StepStatus::NotAttempted,
            audit_id: None,
            error: None,
        }
    }
}

/// One outcome per plan step, in plan order.
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub session_id: String,
    pub steps: Vec<StepOutcome>,
}

impl PlanReport {
    /// True when every step ran and succeeded.
    pub fn ok(&self) -> bool {
        self.steps
            .iter()
            .all(|step| step.status == StepStatus::Succeeded)
    }
}
