//! Curbench Core Library
//!
//! Engine for running a single LLM experiment - a task prompt, a model
//! identifier and an optional tool set - against either an AWS Bedrock or an
//! OpenRouter backend, producing a uniform result record regardless of which
//! backend served the request.
//!
//! The model identifier's lexical shape selects the backend:
//! `provider/model-name` routes to OpenRouter, dot-delimited identifiers
//! like `anthropic.claude-v2:1` route to Bedrock. The orchestration loop
//! alternates model calls and tool executions until a final answer or a
//! limit; transient provider failures are retried with exponential backoff,
//! fatal ones surface immediately.
//!
//! ```no_run
//! use curbench_core::config::{Credentials, EngineConfig};
//! use curbench_core::protocol::ExperimentRequest;
//! use curbench_core::runner::ExperimentRunner;
//!
//! # async fn example() -> Result<(), curbench_core::EngineError> {
//! let runner = ExperimentRunner::new(EngineConfig::default(), Credentials::from_env());
//! let request = ExperimentRequest::new("openai/gpt-4-turbo", "normalize the term 'diabetis'");
//! let result = runner.run(request).await?;
//! println!("{:?}: {:?}", result.status, result.output);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod providers;
pub mod runner;
pub mod tools;

pub use error::{EngineError, EngineResult};

/// Returns the version of the curbench core library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
