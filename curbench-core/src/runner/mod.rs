//! Experiment execution: orchestration loop, runner and cancellation

pub mod cancel;
pub mod experiment;
pub mod orchestrator;

pub use cancel::CancelToken;
pub use experiment::ExperimentRunner;
pub use orchestrator::{LoopRun, OrchestrationLoop};
