//! The experiment runner: pre-flight validation, loop driving, sealing
//!
//! Configuration and capability problems are reported as `Err` before any
//! network call. Runtime failures seal a `Failed` result that preserves the
//! partial transcript for diagnosis.

use crate::config::{Credentials, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::protocol::experiment::{
    ExperimentFailure, ExperimentRequest, ExperimentResult, ExperimentStatus, FailureKind,
};
use crate::protocol::types::{Conversation, ConversationTurn};
use crate::providers::adapter::{BackendCapabilities, BackendKind, InvocationOptions};
use crate::providers::retry::RetryExecutor;
use crate::providers::router::{build_adapter, classify};
use crate::tools::registry::ToolRegistry;
use std::time::Duration;
use tracing::{info, warn};

use super::cancel::CancelToken;
use super::orchestrator::OrchestrationLoop;

/// Entry point for running experiments
///
/// Holds only read-only configuration and credentials, so independent runs
/// may execute concurrently from clones of one runner.
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    config: EngineConfig,
    credentials: Credentials,
}

impl ExperimentRunner {
    /// Create a runner over resolved configuration and credentials
    pub fn new(config: EngineConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// Run one experiment to a sealed result
    pub async fn run(&self, request: ExperimentRequest) -> EngineResult<ExperimentResult> {
        self.run_with_cancel(request, CancelToken::new()).await
    }

    /// Run one experiment, observing the given cancellation token between
    /// loop rounds
    pub async fn run_with_cancel(
        &self,
        request: ExperimentRequest,
        cancel: CancelToken,
    ) -> EngineResult<ExperimentResult> {
        let kind = classify(&request.model)?;
        let adapter = build_adapter(kind, &request.model, &self.config, &self.credentials);

        validate_request(&request, adapter.capabilities(), kind)?;

        let registry = ToolRegistry::with_timeout(
            request.tools.clone(),
            Duration::from_secs(self.config.request_timeout_secs),
        )?;

        info!(
            model = %request.model,
            backend = %kind,
            tools = registry.describe().len(),
            "starting experiment"
        );

        let mut conversation = Conversation::new();
        if let Some(system) = request
            .system_instructions
            .clone()
            .or_else(|| self.config.default_system_instructions.clone())
        {
            conversation.push(ConversationTurn::system(system));
        }
        let prompt = request
            .prompt_override
            .clone()
            .unwrap_or_else(|| request.payload.clone());
        conversation.push(ConversationTurn::user(prompt));

        let options = InvocationOptions {
            temperature: request
                .temperature
                .unwrap_or(self.config.default_temperature),
            max_tokens: request.max_tokens.unwrap_or(self.config.default_max_tokens),
            thinking: request.thinking,
        };

        let orchestration = OrchestrationLoop::new(
            adapter.as_ref(),
            &registry,
            RetryExecutor::new(self.config.retry.clone()),
            options,
            self.config.max_rounds,
            cancel,
        );
        let run = orchestration.run(conversation).await;

        let (output, status, failure) = match run.outcome {
            Ok(answer) => {
                let status = if run.retried {
                    ExperimentStatus::RetriedThenSucceeded
                } else {
                    ExperimentStatus::Success
                };
                (Some(answer), status, None)
            }
            Err(error) => {
                warn!(model = %request.model, error = %error, "experiment failed");
                (
                    None,
                    ExperimentStatus::Failed,
                    Some(failure_detail(&error)),
                )
            }
        };

        Ok(ExperimentResult {
            output,
            transcript: run.conversation,
            tool_calls: run.records,
            usage: run.usage,
            status,
            failure,
            model: request.model,
            backend: kind,
        })
    }
}

/// Check the request's declared features against the backend's capabilities
fn validate_request(
    request: &ExperimentRequest,
    capabilities: &BackendCapabilities,
    backend: BackendKind,
) -> EngineResult<()> {
    if request.thinking && !capabilities.thinking_mode {
        return Err(EngineError::CapabilityMismatch {
            feature: "thinking mode",
            backend,
        });
    }
    if !request.tools.is_empty() && !capabilities.tools {
        return Err(EngineError::CapabilityMismatch {
            feature: "tools",
            backend,
        });
    }
    if request.system_instructions.is_some() && !capabilities.system_instructions {
        return Err(EngineError::CapabilityMismatch {
            feature: "system instructions",
            backend,
        });
    }
    if request.prompt_override.is_some() && !capabilities.custom_prompts {
        return Err(EngineError::CapabilityMismatch {
            feature: "custom prompts",
            backend,
        });
    }
    if request.temperature.is_some() && !capabilities.temperature {
        return Err(EngineError::CapabilityMismatch {
            feature: "temperature",
            backend,
        });
    }
    Ok(())
}

/// Map a runtime engine error onto the failure record of a sealed result
fn failure_detail(error: &EngineError) -> ExperimentFailure {
    let kind = match error {
        EngineError::RetriesExhausted { .. } => FailureKind::RetriesExhausted,
        EngineError::MaxRoundsExceeded { .. } => FailureKind::MaxRoundsExceeded,
        EngineError::Cancelled { .. } => FailureKind::Cancelled,
        // Pre-flight variants never reach sealing; anything else that does
        // is a provider failure
        _ => FailureKind::Provider,
    };
    ExperimentFailure {
        kind,
        message: error.to_string(),
    }
}
