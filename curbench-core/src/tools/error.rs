//! Tool invocation error types

use thiserror::Error;

/// Result type for tool operations
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors raised by the tool registry
///
/// The orchestration loop contains all of these: a failed invocation becomes
/// a tool-result turn describing the failure, never a loop abort.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    /// The model (or a caller) named a tool the registry does not hold
    #[error("tool '{name}' not found in registry")]
    NotFound { name: String },

    /// Arguments failed schema validation; the bound handler was not invoked
    #[error("invalid arguments for tool '{name}': {}", violations.join("; "))]
    InvalidArguments {
        name: String,
        violations: Vec<String>,
    },

    /// A remote tool endpoint answered with a non-2xx status
    #[error("tool '{name}' endpoint returned HTTP {status}: {body}")]
    Execution {
        name: String,
        status: u16,
        body: String,
    },

    /// A local callable reported a failure
    #[error("tool '{name}' failed: {message}")]
    Handler { name: String, message: String },

    /// Transport-level failure reaching a remote tool endpoint
    #[error("tool '{name}' request failed: {detail}")]
    Network { name: String, detail: String },
}
