/// A single tool-call intent within a plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub tool: String,
    pub args: serde_json::Value,
}

/// An ordered sequence of tool-call intents.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub steps: Vec<PlanStep>,
}

impl Plan {
    pub fn new(steps: Vec<PlanStep>) -> Self {
        Self { steps }
    }

    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }
}

/// What to do with the rest of a plan once a step fails.
///
/// Either way, effects already recorded stand; failure policy only
/// governs whether later steps are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    ContinueOnFailure,
    AbortOnFirstFailure,
}
