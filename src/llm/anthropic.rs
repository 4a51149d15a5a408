//! Anthropic Messages API backend.

use super::{ChatModel, ContentBlock, ModelRequest, ModelResponse, StopReason, ToolChoice};
use crate::error::{Result, SyllabusError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Chat backend calling `POST /v1/messages`.
pub struct AnthropicChat {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicChat {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

/// Request body for one call.
fn request_body(request: &ModelRequest) -> Value {
    let mut body = json!({
        "model": request.model,
        "system": request.system,
        "messages": request.messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    });

    if !request.tools.is_empty() {
        body["tools"] = json!(request.tools);
        if let Some(choice) = request.tool_choice {
            body["tool_choice"] = match choice {
                ToolChoice::Auto => json!({"type": "auto"}),
            };
        }
    }

    body
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseBlock {
    Text { text: String },
    ToolUse { id: String, name: String, input: Value },
    #[serde(other)]
    Other,
}

impl From<MessagesResponse> for ModelResponse {
    fn from(response: MessagesResponse) -> Self {
        let content = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(ContentBlock::Text { text }),
                ResponseBlock::ToolUse { id, name, input } => {
                    Some(ContentBlock::ToolUse { id, name, input })
                }
                ResponseBlock::Other => None,
            })
            .collect();

        let stop_reason = match response.stop_reason.as_deref() {
            Some("end_turn") | None => StopReason::EndTurn,
            Some("tool_use") => StopReason::ToolUse,
            Some("max_tokens") => StopReason::MaxTokens,
            Some(other) => StopReason::Other(other.to_string()),
        };

        ModelResponse { content, stop_reason }
    }
}

#[async_trait]
impl ChatModel for AnthropicChat {
    #[instrument(skip(self, request), fields(model = %request.model, tools = request.tools.len()))]
    async fn create(&self, request: &ModelRequest) -> Result<ModelResponse> {
        debug!("Sending {} messages", request.messages.len());

        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Anthropic API error");
            return Err(SyllabusError::Llm(format!(
                "Anthropic API returned {}: {}",
                status, body
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| SyllabusError::Llm(format!("Failed to parse Anthropic response: {}", e)))?;

        Ok(parsed.into())
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
