//! Backend adapter trait and capability profiles
//!
//! An adapter translates the canonical conversation into one provider's wire
//! format and parses the response, including tool calls the model requested.
//! Adapters never retry - resilience belongs to the retry executor - and
//! hold no state between calls beyond their pooled HTTP client.

use crate::protocol::types::{Conversation, ModelResponse};
use crate::providers::error::ProviderError;
use crate::tools::registry::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The two backend families the engine can speak to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// AWS Bedrock runtime (dot-delimited model identifiers)
    Bedrock,
    /// OpenRouter (slash-delimited model identifiers)
    OpenRouter,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bedrock => write!(f, "bedrock"),
            Self::OpenRouter => write!(f, "openrouter"),
        }
    }
}

/// Static capability flags for one backend family
///
/// Checked by the experiment runner before dispatch; a request using a
/// feature its backend lacks never reaches the network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendCapabilities {
    pub system_instructions: bool,
    pub temperature: bool,
    pub tools: bool,
    pub thinking_mode: bool,
    pub custom_prompts: bool,
}

impl BackendCapabilities {
    /// Capability profile of Bedrock-style backends
    pub fn bedrock() -> Self {
        Self {
            system_instructions: true,
            temperature: true,
            tools: true,
            thinking_mode: true,
            custom_prompts: true,
        }
    }

    /// Capability profile of OpenRouter-style backends
    pub fn openrouter() -> Self {
        Self {
            system_instructions: true,
            temperature: true,
            tools: true,
            thinking_mode: false,
            custom_prompts: true,
        }
    }
}

/// Per-invocation sampling and generation parameters
#[derive(Debug, Clone)]
pub struct InvocationOptions {
    /// Sampling temperature (clamped to the provider's range by adapters)
    pub temperature: f32,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Whether thinking mode is enabled for this run
    pub thinking: bool,
}

/// Contract shared by all backend adapters
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Which backend family this adapter speaks to
    fn kind(&self) -> BackendKind;

    /// Short provider name for logging
    fn name(&self) -> &str;

    /// Static capability flags for this backend
    fn capabilities(&self) -> &BackendCapabilities;

    /// Send one request-response cycle to the backend
    ///
    /// Exactly one outbound network call; errors are signalled, never
    /// handled here.
    async fn invoke(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        options: &InvocationOptions,
    ) -> Result<ModelResponse, ProviderError>;
}
