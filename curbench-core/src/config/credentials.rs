//! Credential accessors for the supported backends
//!
//! The engine never reads credential files itself; the caller resolves
//! credentials however it likes and injects them here. A convenience
//! constructor reads the conventional environment variables.

use super::secrets::SecretString;

/// Environment variable holding the OpenRouter API key
pub const OPENROUTER_API_KEY_VAR: &str = "OPENROUTER_API_KEY";

/// Environment variable holding the Bedrock bearer token
pub const BEDROCK_BEARER_TOKEN_VAR: &str = "AWS_BEARER_TOKEN_BEDROCK";

/// Resolved credentials for the provider backends
///
/// A missing credential is not an error until an adapter for that backend
/// actually dispatches a request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub openrouter_api_key: Option<SecretString>,
    pub bedrock_bearer_token: Option<SecretString>,
}

impl Credentials {
    /// Build credentials from the conventional environment variables
    pub fn from_env() -> Self {
        Self {
            openrouter_api_key: std::env::var(OPENROUTER_API_KEY_VAR)
                .ok()
                .filter(|v| !v.is_empty())
                .map(SecretString::new),
            bedrock_bearer_token: std::env::var(BEDROCK_BEARER_TOKEN_VAR)
                .ok()
                .filter(|v| !v.is_empty())
                .map(SecretString::new),
        }
    }

    /// Set the OpenRouter API key
    pub fn with_openrouter_api_key(mut self, key: impl Into<SecretString>) -> Self {
        self.openrouter_api_key = Some(key.into());
        self
    }

    /// Set the Bedrock bearer token
    pub fn with_bedrock_bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bedrock_bearer_token = Some(token.into());
        self
    }
}
