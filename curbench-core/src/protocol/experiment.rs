//! Experiment request and result records
//!
//! An [`ExperimentRequest`] is handed to the engine fully resolved by the
//! caller (CLI or issue-parsing glue); the engine hands back a sealed
//! [`ExperimentResult`] regardless of which backend served the run.

use super::types::{Conversation, TokenUsage};
use crate::providers::adapter::BackendKind;
use crate::tools::registry::ToolDefinition;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A fully-resolved request for a single experiment run
#[derive(Debug, Clone)]
pub struct ExperimentRequest {
    /// Model identifier; its lexical shape selects the backend
    pub model: String,

    /// System instructions; falls back to the configured default
    pub system_instructions: Option<String>,

    /// Prompt override; when absent the task payload is the prompt
    pub prompt_override: Option<String>,

    /// Task-specific payload used as the prompt when no override is given
    pub payload: String,

    /// Sampling temperature; falls back to the configured default
    pub temperature: Option<f32>,

    /// Thinking mode; only meaningful for Bedrock-style models
    pub thinking: bool,

    /// Generation cap; falls back to the configured default
    pub max_tokens: Option<u32>,

    /// Ordered tool definitions made available to the model
    pub tools: Vec<ToolDefinition>,
}

impl ExperimentRequest {
    /// Create a request with the required fields
    pub fn new(model: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instructions: None,
            prompt_override: None,
            payload: payload.into(),
            temperature: None,
            thinking: false,
            max_tokens: None,
            tools: Vec::new(),
        }
    }

    /// Set system instructions
    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = Some(instructions.into());
        self
    }

    /// Override the prompt derived from the payload
    pub fn with_prompt_override(mut self, prompt: impl Into<String>) -> Self {
        self.prompt_override = Some(prompt.into());
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Enable thinking mode
    pub fn with_thinking(mut self, thinking: bool) -> Self {
        self.thinking = thinking;
        self
    }

    /// Set the generation cap
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Provide the tool set for this run
    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }
}

/// Outcome of a single tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallOutcome {
    /// The tool returned a value
    Success(serde_json::Value),
    /// The tool failed; the text is what the model saw
    Error(String),
}

/// Record of one tool invocation during an experiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Position in the experiment's overall tool-call sequence
    pub index: usize,

    /// Name of the invoked tool
    pub name: String,

    /// Arguments the model supplied
    pub arguments: serde_json::Value,

    /// Result or failure as observed by the loop
    pub outcome: ToolCallOutcome,

    /// Wall-clock duration of the invocation
    pub duration: Duration,
}

/// Terminal status of an experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentStatus {
    /// Completed without any retried backend call
    Success,
    /// Completed, but at least one backend call needed a retry
    RetriedThenSucceeded,
    /// Did not reach a final answer
    Failed,
}

/// Classification of a runtime failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Fatal provider error (auth, quota, unknown model, malformed response)
    Provider,
    /// Transient provider errors persisted past the retry budget
    RetriesExhausted,
    /// The loop hit its round bound without a terminal answer
    MaxRoundsExceeded,
    /// The operator cancelled the run between rounds
    Cancelled,
}

/// Structured failure detail carried by a failed result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// The sealed, uniform record of one experiment run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Final model output when the run succeeded
    pub output: Option<String>,

    /// Full conversation transcript, including partial transcripts of
    /// failed runs
    pub transcript: Conversation,

    /// Ordered tool invocation records
    pub tool_calls: Vec<ToolCallRecord>,

    /// Token usage accumulated across successful backend calls
    pub usage: TokenUsage,

    /// Terminal status
    pub status: ExperimentStatus,

    /// Failure detail when `status` is `Failed`
    pub failure: Option<ExperimentFailure>,

    /// Model identifier the run used
    pub model: String,

    /// Backend family that served the run
    pub backend: BackendKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = ExperimentRequest::new("openai/gpt-4-turbo", "label this sample")
            .with_temperature(0.2)
            .with_thinking(false)
            .with_max_tokens(512)
            .with_system_instructions("answer as JSON");

        assert_eq!(request.model, "openai/gpt-4-turbo");
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.max_tokens, Some(512));
        assert!(request.tools.is_empty());
        assert!(!request.thinking);
    }

    #[test]
    fn test_result_serializes() {
        let result = ExperimentResult {
            output: Some("done".to_string()),
            transcript: Conversation::new(),
            tool_calls: Vec::new(),
            usage: TokenUsage::default(),
            status: ExperimentStatus::Success,
            failure: None,
            model: "anthropic.claude-v2".to_string(),
            backend: BackendKind::Bedrock,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["backend"], "bedrock");
    }
}
