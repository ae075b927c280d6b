//! OpenRouter backend adapter
//!
//! Speaks the OpenAI-compatible chat-completions format. Tool calls arrive
//! in `choices[0].message.tool_calls` with string-encoded JSON arguments;
//! tool results are sent back as `role: "tool"` messages linked by
//! `tool_call_id`.

use crate::config::{Credentials, EngineConfig, SecretString};
use crate::protocol::types::{
    Conversation, ModelReply, ModelResponse, RequestedToolCall, Role, TokenUsage,
};
use crate::providers::adapter::{
    BackendAdapter, BackendCapabilities, BackendKind, InvocationOptions,
};
use crate::providers::error::{map_http_error, ProviderError};
use crate::tools::registry::ToolDefinition;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Adapter for OpenRouter-style backends
pub struct OpenRouterAdapter {
    model_id: String,
    base_url: String,
    api_key: Option<SecretString>,
    capabilities: BackendCapabilities,
    client: reqwest::Client,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
}

#[derive(Debug, Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ============================================================================
// Adapter
// ============================================================================

impl OpenRouterAdapter {
    /// Create an adapter for one model against the configured base URL
    pub fn new(model_id: &str, config: &EngineConfig, credentials: &Credentials) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to create HTTP client");

        Self {
            model_id: model_id.to_string(),
            base_url: config.openrouter_base_url.trim_end_matches('/').to_string(),
            api_key: credentials.openrouter_api_key.clone(),
            capabilities: BackendCapabilities::openrouter(),
            client,
        }
    }

    fn build_body(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        options: &InvocationOptions,
    ) -> Value {
        let mut body = json!({
            "model": self.model_id,
            "messages": convert_messages(conversation),
            "max_tokens": options.max_tokens,
            "temperature": options.temperature.clamp(0.0, 2.0),
        });

        if !tools.is_empty() {
            let rendered: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.schema.to_json_schema(),
                        },
                    })
                })
                .collect();
            body["tools"] = json!(rendered);
        }

        body
    }
}

/// Convert the conversation into OpenAI-style chat messages
fn convert_messages(conversation: &Conversation) -> Vec<WireMessage> {
    conversation
        .turns()
        .iter()
        .map(|turn| match turn.role {
            Role::System => WireMessage {
                role: "system",
                content: Some(turn.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Role::User => WireMessage {
                role: "user",
                content: Some(turn.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Role::Model => {
                let tool_calls = if turn.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        turn.tool_calls
                            .iter()
                            .map(|call| WireToolCall {
                                id: call.id.clone(),
                                call_type: "function".to_string(),
                                function: WireFunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.arguments.to_string(),
                                },
                            })
                            .collect(),
                    )
                };
                WireMessage {
                    role: "assistant",
                    content: if turn.content.is_empty() {
                        None
                    } else {
                        Some(turn.content.clone())
                    },
                    tool_calls,
                    tool_call_id: None,
                }
            }
            Role::ToolResult => WireMessage {
                role: "tool",
                content: Some(turn.content.clone()),
                tool_calls: None,
                tool_call_id: turn.tool_call_id.clone(),
            },
        })
        .collect()
}

/// Parse a chat-completions response into a model reply
fn parse_response(response: WireResponse) -> Result<ModelResponse, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormat {
            detail: "response has no choices".to_string(),
        })?;

    let usage = response
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        })
        .unwrap_or_default();

    let reply = match choice.message.tool_calls {
        Some(wire_calls) if !wire_calls.is_empty() => {
            let calls = wire_calls
                .into_iter()
                .enumerate()
                .map(|(position, call)| {
                    // Unparseable argument strings degrade to an empty
                    // object so schema validation reports the problem to
                    // the model instead of the round aborting
                    let arguments =
                        serde_json::from_str(&call.function.arguments).unwrap_or_else(|e| {
                            warn!(
                                tool = %call.function.name,
                                error = %e,
                                "tool call arguments were not valid JSON"
                            );
                            json!({})
                        });
                    RequestedToolCall {
                        id: if call.id.is_empty() {
                            format!("call_{}", position)
                        } else {
                            call.id
                        },
                        name: call.function.name,
                        arguments,
                    }
                })
                .collect();
            ModelReply::ToolUse(calls)
        }
        _ => ModelReply::Answer(choice.message.content.unwrap_or_default()),
    };

    Ok(ModelResponse { reply, usage })
}

#[async_trait]
impl BackendAdapter for OpenRouterAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::OpenRouter
    }

    fn name(&self) -> &str {
        "openrouter"
    }

    fn capabilities(&self) -> &BackendCapabilities {
        &self.capabilities
    }

    async fn invoke(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        options: &InvocationOptions,
    ) -> Result<ModelResponse, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ProviderError::Authentication {
                detail: "no OpenRouter API key configured".to_string(),
            })?;

        let request_id = Uuid::new_v4();
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_body(conversation, tools, options);

        info!(
            model = %self.model_id,
            turns = conversation.len(),
            request_id = %request_id,
            "dispatching OpenRouter invocation"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", api_key.expose_secret()),
            )
            .header("X-Request-ID", request_id.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, request_id = %request_id, "OpenRouter response received");

        if !status.is_success() {
            let headers = response.headers().clone();
            let body_text = response.text().await.ok();
            warn!(
                status = %status,
                request_id = %request_id,
                "OpenRouter invocation failed"
            );
            return Err(map_http_error(
                status,
                Some(&headers),
                body_text,
                &self.model_id,
            ));
        }

        let parsed: WireResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::ResponseFormat {
                    detail: format!("invalid chat-completions response: {}", e),
                })?;

        parse_response(parsed)
    }
}
