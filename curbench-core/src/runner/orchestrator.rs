//! The tool-orchestration loop state machine
//!
//! Alternates model calls and tool executions until the model produces a
//! terminal answer or a limit is hit. States: awaiting the model, awaiting
//! tool results, terminal success, terminal failure. Terminal states are
//! final - the loop never resumes a sealed conversation.

use crate::error::EngineError;
use crate::protocol::experiment::{ToolCallOutcome, ToolCallRecord};
use crate::protocol::types::{
    Conversation, ConversationTurn, ModelReply, RequestedToolCall, TokenUsage,
};
use crate::providers::adapter::{BackendAdapter, InvocationOptions};
use crate::providers::retry::{RetryError, RetryExecutor, RetryOutcome};
use crate::tools::registry::ToolRegistry;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::cancel::CancelToken;

/// Non-terminal states of the loop
enum LoopState {
    /// Waiting for the next model response
    AwaitingModel,
    /// Executing the tool calls the model just requested, in emission order
    AwaitingTool(Vec<RequestedToolCall>),
}

/// Everything a finished loop hands back to the runner
#[derive(Debug)]
pub struct LoopRun {
    /// The full transcript, partial on failure
    pub conversation: Conversation,

    /// Ordered records of every tool invocation
    pub records: Vec<ToolCallRecord>,

    /// Usage accumulated once per successful logical round
    pub usage: TokenUsage,

    /// Whether any round needed at least one retry
    pub retried: bool,

    /// Final answer, or the runtime failure that ended the loop
    pub outcome: Result<String, EngineError>,
}

/// Driver for one experiment's model/tool alternation
pub struct OrchestrationLoop<'a> {
    adapter: &'a dyn BackendAdapter,
    registry: &'a ToolRegistry,
    retry: RetryExecutor,
    options: InvocationOptions,
    max_rounds: u32,
    cancel: CancelToken,
}

impl<'a> OrchestrationLoop<'a> {
    /// Create a loop over one adapter and registry
    pub fn new(
        adapter: &'a dyn BackendAdapter,
        registry: &'a ToolRegistry,
        retry: RetryExecutor,
        options: InvocationOptions,
        max_rounds: u32,
        cancel: CancelToken,
    ) -> Self {
        Self {
            adapter,
            registry,
            retry,
            options,
            max_rounds,
            cancel,
        }
    }

    /// Drive the seeded conversation to a terminal state
    pub async fn run(&self, seed: Conversation) -> LoopRun {
        let mut conversation = seed;
        let mut records: Vec<ToolCallRecord> = Vec::new();
        let mut usage = TokenUsage::default();
        let mut retried = false;
        let mut rounds = 0u32;
        let mut state = LoopState::AwaitingModel;

        let outcome = loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if self.cancel.is_cancelled() {
                        info!(round = rounds + 1, "cancellation observed, stopping loop");
                        break Err(EngineError::Cancelled { round: rounds + 1 });
                    }
                    if rounds >= self.max_rounds {
                        warn!(max_rounds = self.max_rounds, "round bound reached");
                        break Err(EngineError::MaxRoundsExceeded {
                            max_rounds: self.max_rounds,
                        });
                    }
                    rounds += 1;
                    debug!(round = rounds, backend = %self.adapter.kind(), "invoking model");

                    let result = {
                        let conv = &conversation;
                        let tools = self.registry.describe();
                        self.retry
                            .execute(|| self.adapter.invoke(conv, tools, &self.options))
                            .await
                    };

                    match result {
                        Ok(RetryOutcome { value, retries }) => {
                            if retries > 0 {
                                retried = true;
                            }
                            usage.add(value.usage);
                            match value.reply {
                                ModelReply::Answer(text) => {
                                    conversation.push(ConversationTurn::model(text.clone()));
                                    info!(rounds, "model produced terminal answer");
                                    break Ok(text);
                                }
                                ModelReply::ToolUse(calls) => {
                                    debug!(round = rounds, calls = calls.len(), "model requested tools");
                                    conversation
                                        .push(ConversationTurn::model_tool_use(calls.clone()));
                                    LoopState::AwaitingTool(calls)
                                }
                            }
                        }
                        Err(RetryError::Fatal(error)) => {
                            break Err(EngineError::Provider(error));
                        }
                        Err(RetryError::Exhausted { attempts, last }) => {
                            break Err(EngineError::RetriesExhausted { attempts, last });
                        }
                    }
                }
                LoopState::AwaitingTool(calls) => {
                    for call in calls {
                        let started = Instant::now();
                        let invocation = self.registry.invoke(&call.name, &call.arguments).await;
                        let duration = started.elapsed();

                        // Failure boundary: a tool failure becomes a
                        // tool-result turn the model can react to
                        let (content, outcome) = match invocation {
                            Ok(value) => {
                                let rendered = serde_json::to_string_pretty(&value)
                                    .unwrap_or_else(|_| value.to_string());
                                (rendered, ToolCallOutcome::Success(value))
                            }
                            Err(error) => {
                                warn!(tool = %call.name, error = %error, "tool invocation failed");
                                let message = error.to_string();
                                (message.clone(), ToolCallOutcome::Error(message))
                            }
                        };

                        records.push(ToolCallRecord {
                            index: records.len(),
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                            outcome,
                            duration,
                        });
                        conversation.push(ConversationTurn::tool_result(call.id, content));
                    }
                    LoopState::AwaitingModel
                }
            };
        };

        LoopRun {
            conversation,
            records,
            usage,
            retried,
            outcome,
        }
    }
}
