//! Backend adapters, routing and resilience
//!
//! The router classifies a model identifier into a backend family; the
//! adapters translate the canonical conversation into each provider's wire
//! format; the retry executor wraps adapter calls with exponential backoff
//! over the retryable slice of the error taxonomy.

pub mod adapter;
pub mod bedrock;
pub mod error;
pub mod openrouter;
pub mod retry;
pub mod router;

pub use adapter::{BackendAdapter, BackendCapabilities, BackendKind, InvocationOptions};
pub use bedrock::BedrockAdapter;
pub use error::{map_http_error, ProviderError, ProviderResult};
pub use openrouter::OpenRouterAdapter;
pub use retry::{RetryError, RetryExecutor, RetryOutcome, RetryPolicy, Retryable};
pub use router::{build_adapter, classify};
