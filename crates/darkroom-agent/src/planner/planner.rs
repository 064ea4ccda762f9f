use async_trait::async_trait;

use super::plan::Plan;
use super::types::PlanRequest;
use crate::error::AgentResult;

/// An upstream strategy that turns a request into an ordered tool-call
/// plan. How the plan is produced is opaque to the execution core.
#[async_trait]
pub trait Planner: Send + Sync {
    fn name(&self) -> &str;

    async fn plan(&self, request: &PlanRequest) -> AgentResult<Plan>;
}

/// Planner that always returns a fixed plan. Deterministic; backs the
/// shadow harness in tests and scripted workflows.
pub struct ScriptedPlanner {
    name: String,
    plan: Plan,
}

impl ScriptedPlanner {
    pub fn new(name: impl Into<String>, plan: Plan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

#[async_trait]
impl Planner for ScriptedPlanner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn plan(&self, _request: &PlanRequest) -> AgentResult<Plan> {
        Ok(self.plan.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::plan::PlanStep;
    use serde_json::json;

    fn make_request(goal: &str) -> PlanRequest {
        PlanRequest {
            goal: goal.to_string(),
            tools: Vec::new(),
        }
    }

    #[tokio::test]
    async fn scripted_planner_returns_its_plan() {
        let plan = Plan::new(vec![PlanStep {
            tool: "clients.lookup".to_string(),
            args: json!({"query": "mara"}),
        }]);
        let planner = ScriptedPlanner::new("legacy", plan.clone());

        assert_eq!(planner.name(), "legacy");
        let produced = planner.plan(&make_request("find mara")).await.unwrap();
        assert_eq!(produced, plan);
    }

    #[tokio::test]
    async fn scripted_output_is_deterministic() {
        let plan = Plan::new(vec![PlanStep {
            tool: "invoices.report".to_string(),
            args: json!({"client_id": "c-1"}),
        }]);
        let planner = ScriptedPlanner::new("current", plan);

        let first = planner.plan(&make_request("invoice summary")).await.unwrap();
        let second = planner.plan(&make_request("invoice summary")).await.unwrap();
        assert_eq!(first, second);
    }
}
