//! Network construction: the structure-learner boundary and the pipeline around it.
pub mod learner;
pub mod pipeline;

pub use learner::{CiTest, LearnError, PcParams, PcVariant, Pdag, PrecomputedPdag, StructureLearner};
pub use pipeline::{NetworkError, NetworkJob, NetworkOutcome};
