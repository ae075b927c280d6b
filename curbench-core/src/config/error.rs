//! Configuration error types with detailed error reporting

use thiserror::Error;

/// Main configuration error type with detailed context
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config from '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Environment variable '{var}' not found")]
    EnvVarNotFound { var: String },

    #[error("Validation failed at '{field}': {message}")]
    Validation { field: String, message: String },
}

impl ConfigError {
    /// Helper to create a validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
