//! Core conversation types for model interactions
//!
//! The conversation is an ordered, append-only sequence of turns. Turns are
//! never mutated or removed once appended, so each loop round's input is
//! exactly the prior rounds' output plus the new turns - trivially
//! replayable in tests.

use serde::{Deserialize, Serialize};

/// Role of a turn in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// System instructions that guide the model's behavior
    System,
    /// User input (the task prompt)
    User,
    /// Model output, possibly carrying requested tool calls
    Model,
    /// Result of a tool invocation, linked back by `tool_call_id`
    ToolResult,
}

/// A tool call requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestedToolCall {
    /// Provider-assigned identifier for this call
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as a JSON object
    pub arguments: serde_json::Value,
}

/// A single turn in the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Role of the turn
    pub role: Role,

    /// Text content of the turn
    pub content: String,

    /// Tool calls requested by a model turn
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<RequestedToolCall>,

    /// For tool-result turns, the id of the call this answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ConversationTurn {
    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a model turn holding a final text answer
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a model turn recording requested tool calls
    pub fn model_tool_use(calls: Vec<RequestedToolCall>) -> Self {
        Self {
            role: Role::Model,
            content: String::new(),
            tool_calls: calls,
            tool_call_id: None,
        }
    }

    /// Create a tool-result turn answering a requested call
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::ToolResult,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: Some(tool_call_id.into()),
        }
    }
}

/// An ordered, append-only sequence of conversation turns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn; appended turns are never mutated or removed
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// All turns in order
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// Number of turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation has no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of model turns (one per completed loop round)
    pub fn model_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::Model).count()
    }
}

impl<'a> IntoIterator for &'a Conversation {
    type Item = &'a ConversationTurn;
    type IntoIter = std::slice::Iter<'a, ConversationTurn>;

    fn into_iter(self) -> Self::IntoIter {
        self.turns.iter()
    }
}

/// What the model produced in one request-response cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ModelReply {
    /// A terminal text answer
    Answer(String),
    /// One or more requested tool calls, in emission order
    ToolUse(Vec<RequestedToolCall>),
}

/// Token usage counters for one model call or a whole experiment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Accumulate another usage sample into this one
    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    /// Total tokens across input and output
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }
}

/// Parsed result of one backend invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /// The model's reply for this cycle
    pub reply: ModelReply,

    /// Token usage reported by the provider for this call
    pub usage: TokenUsage,
}
