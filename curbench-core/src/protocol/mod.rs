//! Conversation and experiment data model
//!
//! Fundamental data structures shared across the engine: the append-only
//! conversation, model replies, token usage, and the experiment
//! request/result records.

pub mod experiment;
pub mod types;

pub use experiment::{
    ExperimentFailure, ExperimentRequest, ExperimentResult, ExperimentStatus, FailureKind,
    ToolCallOutcome, ToolCallRecord,
};
pub use types::{
    Conversation, ConversationTurn, ModelReply, ModelResponse, RequestedToolCall, Role, TokenUsage,
};
