pub mod comparator;
pub mod policy;

pub use comparator::{RunnerOutcome, ShadowComparator, ShadowRunner, ShadowVerdict};
pub use policy::{EquivalencePolicy, GrossOutcome, ShadowRun, StepOutcomes};
