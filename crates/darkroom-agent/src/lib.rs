pub mod agent;

pub mod config;
pub mod error;
pub mod storage;
pub mod utils;

pub mod audit;
pub mod bus;
pub mod event;
pub mod permissions;
pub mod planner;
pub mod runtime;
pub mod session;
pub mod shadow;
pub mod tools;

pub use crate::agent::Agent;
pub use crate::audit::{AuditLog, AuditQuery, AuditRecord};
pub use crate::error::{AgentError, AgentResult};
pub use crate::permissions::{authorize, scope_set, GateDecision, Scope, ScopeSet, SessionMode};
pub use crate::planner::{FailurePolicy, Plan, PlanRequest, PlanStep, Planner, ScriptedPlanner};
pub use crate::runtime::{PlanReport, StepOutcome, StepStatus};
pub use crate::session::{Message, MessageRole, Session, SessionOwner, SessionStore};
pub use crate::shadow::{EquivalencePolicy, ShadowComparator, ShadowRunner, ShadowVerdict};
pub use crate::tools::{
    register_builtin_tools, ExecutionMode, RiskLevel, ToolDefinition, ToolHandler, ToolRegistry,
};
