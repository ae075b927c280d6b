//! Top-level engine error
//!
//! Configuration and capability problems are raised before any network
//! call; the remaining variants classify runtime failures of a run that had
//! already started (those also appear, with the partial transcript, inside a
//! failed experiment result).

use crate::config::ConfigError;
use crate::providers::adapter::BackendKind;
use crate::providers::error::ProviderError;
use thiserror::Error;

/// Errors surfaced by the experiment engine
#[derive(Debug, Error)]
pub enum EngineError {
    /// The model identifier matches neither routing shape
    #[error("unrecognized model identifier format: '{model}'")]
    UnrecognizedModelFormat { model: String },

    /// The request uses a feature the selected backend does not support
    #[error("{feature} is not supported by the {backend} backend")]
    CapabilityMismatch {
        feature: &'static str,
        backend: BackendKind,
    },

    /// Invalid engine or tool configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Fatal provider failure, surfaced immediately without retries
    #[error(transparent)]
    Provider(ProviderError),

    /// Transient provider failures persisted past the retry budget
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: ProviderError },

    /// The loop hit its round bound without a terminal model response
    #[error("conversation exceeded {max_rounds} rounds without a final answer")]
    MaxRoundsExceeded { max_rounds: u32 },

    /// The operator cancelled the run; observed between rounds
    #[error("experiment cancelled before round {round}")]
    Cancelled { round: u32 },
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
