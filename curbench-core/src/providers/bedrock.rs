//! Bedrock backend adapter
//!
//! Speaks the Anthropic messages format to the Bedrock runtime's
//! `/model/{id}/invoke` endpoint, authenticating with a bearer token. Tool
//! calls arrive as `tool_use` content blocks; tool results are sent back as
//! `tool_result` blocks inside a user-role message, with consecutive results
//! merged into one message because the API requires alternating roles.

use crate::config::{Credentials, EngineConfig, SecretString};
use crate::protocol::types::{
    Conversation, ConversationTurn, ModelReply, ModelResponse, RequestedToolCall, Role, TokenUsage,
};
use crate::providers::adapter::{
    BackendAdapter, BackendCapabilities, BackendKind, InvocationOptions,
};
use crate::providers::error::{map_http_error, ProviderError};
use crate::tools::registry::ToolDefinition;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Adapter for Bedrock-style backends
pub struct BedrockAdapter {
    model_id: String,
    endpoint: String,
    anthropic_version: String,
    thinking_budget_tokens: u32,
    bearer_token: Option<SecretString>,
    capabilities: BackendCapabilities,
    client: reqwest::Client,
}

impl BedrockAdapter {
    /// Create an adapter for one model against the configured endpoint
    pub fn new(model_id: &str, config: &EngineConfig, credentials: &Credentials) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()
            .expect("failed to create HTTP client");

        Self {
            model_id: model_id.to_string(),
            endpoint: config.bedrock_runtime_endpoint(),
            anthropic_version: config.anthropic_version.clone(),
            thinking_budget_tokens: config.thinking_budget_tokens,
            bearer_token: credentials.bedrock_bearer_token.clone(),
            capabilities: BackendCapabilities::bedrock(),
            client,
        }
    }

    /// Build the Anthropic-messages request body
    fn build_body(
        &self,
        conversation: &Conversation,
        tools: &[ToolDefinition],
        options: &InvocationOptions,
    ) -> Value {
        let mut body = json!({
            "anthropic_version": self.anthropic_version,
            "max_tokens": options.max_tokens,
            "temperature": options.temperature.clamp(0.0, 1.0),
            "messages": convert_messages(conversation),
        });

        if let Some(system) = system_instructions(conversation) {
            body["system"] = json!(system);
        }

        if !tools.is_empty() {
            let rendered: Vec<Value> = tools
                .iter()
                .map(|tool| {
                    json!({
                        "name": tool.name,
                        "description": tool.description,
                        "input_schema": tool.schema.to_json_schema(),
                    })
                })
                .collect();
            body["tools"] = json!(rendered);
        }

        if options.thinking {
            body["thinking"] = json!({
                "type": "enabled",
                "budget_tokens": self.thinking_budget_tokens,
            });
        }

        body
    }
}

/// First system turn of the conversation, if any
fn system_instructions(conversation: &Conversation) -> Option<&str> {
    conversation
        .turns()
        .iter()
        .find(|turn| turn.role == Role::System)
        .map(|turn| turn.content.as_str())
}

/// Convert the conversation into alternating Anthropic messages
fn convert_messages(conversation: &Conversation) -> Vec<Value> {
    let mut messages: Vec<Value> = Vec::new();
    let mut pending_results: Vec<Value> = Vec::new();

    let flush_results = |messages: &mut Vec<Value>, pending: &mut Vec<Value>| {
        if !pending.is_empty() {
            messages.push(json!({
                "role": "user",
                "content": std::mem::take(pending),
            }));
        }
    };

    for turn in conversation.turns() {
        match turn.role {
            // System instructions travel in the top-level `system` field
            Role::System => {}
            Role::User => {
                flush_results(&mut messages, &mut pending_results);
                messages.push(json!({
                    "role": "user",
                    "content": [{"type": "text", "text": turn.content}],
                }));
            }
            Role::Model => {
                flush_results(&mut messages, &mut pending_results);
                messages.push(json!({
                    "role": "assistant",
                    "content": model_turn_blocks(turn),
                }));
            }
            Role::ToolResult => {
                pending_results.push(json!({
                    "type": "tool_result",
                    "tool_use_id": turn.tool_call_id.as_deref().unwrap_or_default(),
                    "content": turn.content,
                }));
            }
        }
    }
    flush_results(&mut messages, &mut pending_results);

    messages
}

/// Content blocks for a model turn: optional text plus tool_use blocks
fn model_turn_blocks(turn: &ConversationTurn) -> Vec<Value> {
    let mut blocks = Vec::new();
    if !turn.content.is_empty() {
        blocks.push(json!({"type": "text", "text": turn.content}));
    }
    for call in &turn.tool_calls {
        blocks.push(json!({
            "type": "tool_use",
            "id": call.id,
            "name": call.name,
            "input": call.arguments,
        }));
    }
    blocks
}

/// Parse an Anthropic messages response into a model reply
fn parse_response(body: &Value) -> Result<ModelResponse, ProviderError> {
    let content = body
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| ProviderError::ResponseFormat {
            detail: "response has no content array".to_string(),
        })?;

    let mut text = String::new();
    let mut calls: Vec<RequestedToolCall> = Vec::new();

    for block in content {
        match block.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(piece) = block.get("text").and_then(|t| t.as_str()) {
                    text.push_str(piece);
                }
            }
            Some("tool_use") => {
                let name = block
                    .get("name")
                    .and_then(|n| n.as_str())
                    .ok_or_else(|| ProviderError::ResponseFormat {
                        detail: "tool_use block has no name".to_string(),
                    })?;
                calls.push(RequestedToolCall {
                    id: block
                        .get("id")
                        .and_then(|i| i.as_str())
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("toolu_{}", calls.len())),
                    name: name.to_string(),
                    arguments: block.get("input").cloned().unwrap_or_else(|| json!({})),
                });
            }
            // Thinking blocks and future block types carry no reply content
            _ => {}
        }
    }

    let usage = TokenUsage {
        input_tokens: read_u32(body, "/usage/input_tokens"),
        output_tokens: read_u32(body, "/usage/output_tokens"),
    };

    let reply = if calls.is_empty() {
        ModelReply::Answer(text)
    } else {
        ModelReply::ToolUse(calls)
    };

    Ok(ModelResponse { reply, usage })
}

fn read_u32(body: &Value, pointer: &str) -> u32 {
    body.pointer(pointer)
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32
}

#[async_trait]
impl BackendAdapter for BedrockAdapter {
    fn kind(&self) -> BackendKind {
        BackendKind::Bedrock
    }

    fn name(&self) -> &str {
        "bedrock"
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
        let token = self
            .bearer_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Authentication {
                detail: format!(
                    "no Bedrock bearer token configured for model '{}'",
                    self.model_id
                ),
            })?;

        let request_id = Uuid::new_v4();
        let url = format!("{}/model/{}/invoke", self.endpoint, self.model_id);
        let body = self.build_body(conversation, tools, options);

        info!(
            model = %self.model_id,
            turns = conversation.len(),
            request_id = %request_id,
            "dispatching Bedrock invocation"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header(
                "Authorization",
                format!("Bearer {}", token.expose_secret()),
            )
            .header("X-Request-ID", request_id.to_string())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, request_id = %request_id, "Bedrock response received");

        if !status.is_success() {
            let headers = response.headers().clone();
            let body_text = response.text().await.ok();
            warn!(
                status = %status,
                request_id = %request_id,
                "Bedrock invocation failed"
            );
            return Err(map_http_error(
                status,
                Some(&headers),
                body_text,
                &self.model_id,
            ));
        }

        let parsed: Value =
            response
                .json()
                .await
                .map_err(|e| ProviderError::ResponseFormat {
                    detail: format!("invalid JSON response: {}", e),
                })?;

        parse_response(&parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapter() -> BedrockAdapter {
        let config = EngineConfig::default();
        let credentials = Credentials::default().with_bedrock_bearer_token("test-token");
        BedrockAdapter::new("anthropic.claude-v2:1", &config, &credentials)
    }

    #[test]
    fn test_body_includes_system_and_thinking() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationTurn::system("curate metadata"));
        conversation.push(ConversationTurn::user("normalize this term"));

        let options = InvocationOptions {
            temperature: 0.3,
            max_tokens: 512,
            thinking: true,
        };
        let body = adapter().build_body(&conversation, &[], &options);

        assert_eq!(body["system"], "curate metadata");
        assert_eq!(body["thinking"]["type"], "enabled");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_temperature_clamped_to_anthropic_range() {
        let conversation = Conversation::new();
        let options = InvocationOptions {
            temperature: 1.7,
            max_tokens: 16,
            thinking: false,
        };
        let body = adapter().build_body(&conversation, &[], &options);
        assert_eq!(body["temperature"], 1.0);
    }

    #[test]
    fn test_consecutive_tool_results_merge_into_one_message() {
        let mut conversation = Conversation::new();
        conversation.push(ConversationTurn::user("look both up"));
        conversation.push(ConversationTurn::model_tool_use(vec![
            RequestedToolCall {
                id: "a".into(),
                name: "search".into(),
                arguments: json!({"term": "x"}),
            },
            RequestedToolCall {
                id: "b".into(),
                name: "search".into(),
                arguments: json!({"term": "y"}),
            },
        ]));
        conversation.push(ConversationTurn::tool_result("a", "found x"));
        conversation.push(ConversationTurn::tool_result("b", "found y"));

        let messages = convert_messages(&conversation);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(messages[2]["content"].as_array().unwrap().len(), 2);
        assert_eq!(messages[2]["content"][0]["type"], "tool_result");
    }

    #[test]
    fn test_parse_text_answer() {
        let body = json!({
            "content": [{"type": "text", "text": "the answer"}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 11, "output_tokens": 3}
        });
        let response = parse_response(&body).unwrap();
        assert_eq!(response.reply, ModelReply::Answer("the answer".to_string()));
        assert_eq!(response.usage.input_tokens, 11);
        assert_eq!(response.usage.output_tokens, 3);
    }

    #[test]
    fn test_parse_tool_use() {
        let body = json!({
            "content": [
                {"type": "thinking", "thinking": "let me check"},
                {"type": "tool_use", "id": "toolu_1", "name": "search",
                 "input": {"term": "diabetes"}}
            ],
            "stop_reason": "tool_use",
            "usage": {"input_tokens": 20, "output_tokens": 9}
        });
        let response = parse_response(&body).unwrap();
        match response.reply {
            ModelReply::ToolUse(calls) => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "search");
                assert_eq!(calls[0].arguments["term"], "diabetes");
            }
            other => panic!("expected tool use, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_missing_content_is_response_format_error() {
        let body = json!({"message": "something else entirely"});
        let err = parse_response(&body).unwrap_err();
        assert!(matches!(err, ProviderError::ResponseFormat { .. }));
    }
}
