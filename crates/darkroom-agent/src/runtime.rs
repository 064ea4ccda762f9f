//! Per-session runtime actors and plan execution.

pub mod actor;
pub mod handle;
pub mod protocol;
pub mod registry;

pub use handle::SessionRuntimeHandle;
pub use protocol::{PlanReport, StepOutcome, StepStatus};
pub use registry::SessionRuntimeRegistry;
