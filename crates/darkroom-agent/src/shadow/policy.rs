//! Equivalence judgment between a legacy and a current run.

use crate::runtime::protocol::PlanReport;

/// What one runner produced: a report when planning and execution got
/// off the ground, or the hard error that stopped it.
#[derive(Debug)]
pub struct ShadowRun {
    pub runner: String,
    pub report: Option<PlanReport>,
    pub error: Option<String>,
}

impl ShadowRun {
    /// Gross success: the run produced a report and every step passed.
    pub fn ok(&self) -> bool {
        self.report.as_ref().is_some_and(|report| report.ok())
    }
}

/// How two runs are judged equivalent. Implementations must be pure;
/// the comparator records which policy produced each verdict.
pub trait EquivalencePolicy: Send + Sync {
    fn name(&self) -> &str;

    fn equivalent(&self, legacy: &ShadowRun, current: &ShadowRun) -> bool;
}

/// Default policy: both runs gross-succeed or both gross-fail. Blind
/// to result payloads on purpose; payload drift is expected while two
/// planners coexist.
pub struct GrossOutcome;

impl EquivalencePolicy for GrossOutcome {
    fn name(&self) -> &str {
        "gross_outcome"
    }

    fn equivalent(&self, legacy: &ShadowRun, current: &ShadowRun) -> bool {
        legacy.ok() == current.ok()
    }
}

/// Stricter policy: same number of steps with pairwise-equal statuses.
pub struct StepOutcomes;

impl EquivalencePolicy for StepOutcomes {
    fn name(&self) -> &str {
        "step_outcomes"
    }

    fn equivalent(&self, legacy: &ShadowRun, current: &ShadowRun) -> bool {
        match (&legacy.report, &current.report) {
            (Some(legacy), Some(current)) => {
                legacy.steps.len() == current.steps.len()
                    && legacy
                        .steps
                        .iter()
                        .zip(current.steps.iter())
                        .all(|(a, b)| a.status == b.status)
            }
            (None, None) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::protocol::{StepOutcome, StepStatus};

    fn run_with(statuses: &[StepStatus]) -> ShadowRun {
        ShadowRun {
            runner: "test".to_string(),
            report: Some(PlanReport {
                session_id: "s-1".to_string(),
                steps: statuses
                    .iter()
                    .map(|status| StepOutcome {
                        tool: "clients.lookup".to_string(),
                        status: status.clone(),
                        audit_id: Some("a-1".to_string()),
                        error: None,
                    })
                    .collect(),
            }),
            error: None,
        }
    }

    fn failed_run() -> ShadowRun {
        ShadowRun {
            runner: "test".to_string(),
            report: None,
            error: Some("planner unavailable".to_string()),
        }
    }

    #[test]
    fn gross_outcome_matches_on_overall_result() {
        let policy = GrossOutcome;
        let pass = run_with(&[StepStatus::Succeeded]);
        let fail = run_with(&[StepStatus::Failed]);

        assert!(policy.equivalent(&pass, &run_with(&[StepStatus::Succeeded])));
        assert!(policy.equivalent(&fail, &failed_run()));
        assert!(!policy.equivalent(&pass, &fail));
    }

    #[test]
    fn gross_outcome_ignores_step_shape() {
        let policy = GrossOutcome;
        let one = run_with(&[StepStatus::Succeeded]);
        let three = run_with(&[
            StepStatus::Succeeded,
            StepStatus::Succeeded,
            StepStatus::Succeeded,
        ]);
        assert!(policy.equivalent(&one, &three));
    }

    #[test]
    fn step_outcomes_requires_matching_statuses() {
        let policy = StepOutcomes;
        let a = run_with(&[StepStatus::Succeeded, StepStatus::Failed]);
        let b = run_with(&[StepStatus::Succeeded, StepStatus::Failed]);
        let c = run_with(&[StepStatus::Failed, StepStatus::Succeeded]);
        let short = run_with(&[StepStatus::Failed]);

        assert!(policy.equivalent(&a, &b));
        assert!(!policy.equivalent(&a, &c));
        assert!(!policy.equivalent(&a, &short));
        assert!(!policy.equivalent(&a, &failed_run()));
        assert!(policy.equivalent(&failed_run(), &failed_run()));
    }
}
