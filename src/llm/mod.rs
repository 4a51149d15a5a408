//! Chat model transport.
//!
//! A provider-neutral request/response shape built from typed content
//! blocks, with Anthropic and OpenAI backends behind the [`ChatModel`]
//! trait. The block shapes follow the Anthropic Messages API, so that
//! backend serializes them as-is.

mod anthropic;
mod openai;

pub use anthropic::AnthropicChat;
pub use openai::OpenAIChat;

use crate::config::{LlmProvider, LlmSettings};
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A typed piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// A plain-text user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// An assistant turn echoing the model's own blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// A user turn carrying tool results.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}

/// Tool schema offered to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments.
    pub input_schema: Value,
}

/// How the model may use the offered tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolChoice {
    /// The model decides whether to call a tool.
    Auto,
}

/// A single model call.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    /// System text, sent out of band from the message list.
    pub system: String,
    pub messages: Vec<Message>,
    /// Tools offered for this call. Empty disables tool use.
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<ToolChoice>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other(String),
}

/// A borrowed view of one tool-use request.
#[derive(Debug, Clone, Copy)]
pub struct ToolUse<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a Value,
}

/// Model output.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: StopReason,
}

impl ModelResponse {
    /// Text of the first text block, or an empty string.
    pub fn text(&self) -> &str {
        self.content
            .iter()
            .find_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// Tool-use requests, in the order the model listed them.
    pub fn tool_uses(&self) -> Vec<ToolUse<'_>> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolUse { id, name, input }),
                _ => None,
            })
            .collect()
    }

    /// Whether the model stopped to have tools run.
    pub fn requests_tools(&self) -> bool {
        self.stop_reason == StopReason::ToolUse && !self.tool_uses().is_empty()
    }
}

/// Trait for chat model backends.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one model call.
    async fn create(&self, request: &ModelRequest) -> Result<ModelResponse>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Create the chat backend named by `settings.provider`.
///
/// The API key is read from the provider's environment variable.
pub fn create_chat_model(settings: &LlmSettings) -> Result<Arc<dyn ChatModel>> {
    let var = settings.provider.api_key_var();
    let api_key = std::env::var(var)
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| SyllabusError::Config(format!("{} is not set", var)))?;

    Ok(match settings.provider {
        LlmProvider::Anthropic => Arc::new(AnthropicChat::new(api_key)),
        LlmProvider::OpenAI => Arc::new(OpenAIChat::new()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_block_serialization() {
        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "ok".to_string(),
            is_error: false,
        };
        assert_eq!(
            serde_json::to_value(&block).unwrap(),
            json!({"type": "tool_result", "tool_use_id": "toolu_1", "content": "ok"})
        );

        let block = ContentBlock::ToolResult {
            tool_use_id: "toolu_1".to_string(),
            content: "boom".to_string(),
            is_error: true,
        };
        assert_eq!(serde_json::to_value(&block).unwrap()["is_error"], json!(true));

        let message = Message::user("hi");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"role": "user", "content": [{"type": "text", "text": "hi"}]})
        );
    }

    #[test]
    fn test_response_accessors() {
        let response = ModelResponse {
            content: vec![
                ContentBlock::text("Let me look that up."),
                ContentBlock::ToolUse {
                    id: "a".to_string(),
                    name: "search_course_content".to_string(),
                    input: json!({"query": "x"}),
                },
                ContentBlock::ToolUse {
                    id: "b".to_string(),
                    name: "get_course_outline".to_string(),
                    input: json!({"course_name": "y"}),
                },
            ],
            stop_reason: StopReason::ToolUse,
        };

        assert_eq!(response.text(), "Let me look that up.");
        let names: Vec<_> = response.tool_uses().iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["search_course_content", "get_course_outline"]);
        assert!(response.requests_tools());

        let direct = ModelResponse {
            content: vec![ContentBlock::text("Answer")],
            stop_reason: StopReason::EndTurn,
        };
        assert!(!direct.requests_tools());

        let empty = ModelResponse {
            content: vec![],
            stop_reason: StopReason::ToolUse,
        };
        assert_eq!(empty.text(), "");
        assert!(!empty.requests_tools());
    }
}
