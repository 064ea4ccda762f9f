pub mod builtins;
pub mod executor;
pub mod handler;
pub mod registry;
pub mod schema;

pub use builtins::register_builtin_tools;
pub use executor::{ExecutionMode, ExecutionOutcome, ToolExecutor};
pub use handler::{ExternalCallTool, MutationTool, QueryTool, ToolHandler};
pub use registry::{RegistryStats, ToolRegistry};
pub use schema::{validate_schema, RiskLevel, ToolDefinition};
