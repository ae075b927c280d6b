//! Engine configuration
//!
//! Runtime knobs for the experiment engine: sampling defaults, loop bounds,
//! timeouts, backend endpoints and the retry policy. Loadable from YAML or
//! JSON with `${VAR}` environment interpolation, or built in code via
//! [`EngineConfig::default`].

mod credentials;
mod env;
mod error;
mod secrets;

pub use credentials::{Credentials, BEDROCK_BEARER_TOKEN_VAR, OPENROUTER_API_KEY_VAR};
pub use env::interpolate_env_vars;
pub use error::{ConfigError, ConfigResult};
pub use secrets::SecretString;

use crate::providers::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the experiment engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sampling temperature applied when a request does not set one
    pub default_temperature: f32,

    /// Generation cap applied when a request does not set one
    pub default_max_tokens: u32,

    /// System instructions applied when a request does not carry any
    pub default_system_instructions: Option<String>,

    /// Maximum model-call rounds per experiment before the loop gives up
    pub max_rounds: u32,

    /// Per-request timeout for provider and remote-tool calls (seconds)
    pub request_timeout_secs: u64,

    /// Connect timeout for outbound HTTP (seconds)
    pub connect_timeout_secs: u64,

    /// AWS region used to derive the Bedrock runtime endpoint
    pub aws_region: String,

    /// Full Bedrock runtime endpoint override (takes precedence over region)
    pub bedrock_endpoint: Option<String>,

    /// OpenRouter API base URL
    pub openrouter_base_url: String,

    /// Anthropic wire-format version sent to Bedrock
    pub anthropic_version: String,

    /// Thinking budget passed to Bedrock when thinking mode is enabled
    pub thinking_budget_tokens: u32,

    /// Retry policy wrapped around every backend call
    pub retry: RetryPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_temperature: 0.0,
            default_max_tokens: 4096,
            default_system_instructions: None,
            max_rounds: 10,
            request_timeout_secs: 300,
            connect_timeout_secs: 10,
            aws_region: "us-east-1".to_string(),
            bedrock_endpoint: None,
            openrouter_base_url: "https://openrouter.ai/api/v1".to_string(),
            anthropic_version: "bedrock-2023-05-31".to_string(),
            thinking_budget_tokens: 1024,
            retry: RetryPolicy::default(),
        }
    }
}

impl EngineConfig {
    /// The Bedrock runtime endpoint for this configuration
    pub fn bedrock_runtime_endpoint(&self) -> String {
        self.bedrock_endpoint.clone().unwrap_or_else(|| {
            format!("https://bedrock-runtime.{}.amazonaws.com", self.aws_region)
        })
    }
}

/// Load an engine configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    // Interpolate environment variables before parsing
    let interpolated = interpolate_env_vars(&content)?;

    serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::Parse {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })
}

/// Load an engine configuration from a JSON file
pub fn load_from_json<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    let interpolated = interpolate_env_vars(&content)?;

    serde_json::from_str(&interpolated).map_err(|e| ConfigError::Parse {
        path: path.to_string_lossy().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_temperature, 0.0);
        assert_eq!(config.default_max_tokens, 4096);
        assert_eq!(config.max_rounds, 10);
        assert_eq!(
            config.bedrock_runtime_endpoint(),
            "https://bedrock-runtime.us-east-1.amazonaws.com"
        );
    }

    #[test]
    fn test_endpoint_override_wins() {
        let config = EngineConfig {
            bedrock_endpoint: Some("http://localhost:9001".to_string()),
            ..Default::default()
        };
        assert_eq!(config.bedrock_runtime_endpoint(), "http://localhost:9001");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "max_rounds: 4\naws_region: eu-west-1\n";
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.max_rounds, 4);
        assert_eq!(config.aws_region, "eu-west-1");
        assert_eq!(config.default_max_tokens, 4096);
    }
}
