//! Ordered tool-call plans and the strategies that produce them.

pub mod plan;
pub mod planner;
pub mod types;

pub use plan::{FailurePolicy, Plan, PlanStep};
pub use planner::{Planner, ScriptedPlanner};
pub use types::{PlanRequest, ToolSpec};
