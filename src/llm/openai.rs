//! OpenAI Chat Completions backend.

use super::{
    ChatModel, ContentBlock, Message, ModelRequest, ModelResponse, Role, StopReason, ToolChoice,
    ToolDefinition,
};
use crate::error::{Result, SyllabusError};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolChoiceOption, ChatCompletionToolType,
    CreateChatCompletionRequestArgs, FinishReason, FunctionCall, FunctionObject,
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat backend using the OpenAI client shared with the embedder.
pub struct OpenAIChat {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
}

impl OpenAIChat {
    pub fn new() -> Self {
        Self {
            client: create_client(),
        }
    }
}

impl Default for OpenAIChat {
    fn default() -> Self {
        Self::new()
    }
}

fn build_err(e: impl std::fmt::Display) -> SyllabusError {
    SyllabusError::Llm(e.to_string())
}

/// Flatten typed turns into Chat Completions messages.
///
/// Tool results become one `tool` message each; tool-use blocks become the
/// assistant message's `tool_calls`.
fn to_api_messages(
    system: &str,
    messages: &[Message],
) -> Result<Vec<ChatCompletionRequestMessage>> {
    let mut result: Vec<ChatCompletionRequestMessage> = vec![
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system.to_string())
            .build()
            .map_err(build_err)?
            .into(),
    ];

    for message in messages {
        let mut text = Vec::new();
        let mut tool_calls = Vec::new();

        for block in &message.content {
            match block {
                ContentBlock::Text { text: t } => text.push(t.as_str()),
                ContentBlock::ToolUse { id, name, input } => {
                    tool_calls.push(ChatCompletionMessageToolCall {
                        id: id.clone(),
                        r#type: ChatCompletionToolType::Function,
                        function: FunctionCall {
                            name: name.clone(),
                            arguments: input.to_string(),
                        },
                    })
                }
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => result.push(
                    ChatCompletionRequestToolMessageArgs::default()
                        .tool_call_id(tool_use_id.clone())
                        .content(content.clone())
                        .build()
                        .map_err(build_err)?
                        .into(),
                ),
            }
        }

        match message.role {
            Role::User if !text.is_empty() => result.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(text.join("\n"))
                    .build()
                    .map_err(build_err)?
                    .into(),
            ),
            Role::Assistant => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                if !text.is_empty() {
                    args.content(text.join("\n"));
                }
                if !tool_calls.is_empty() {
                    args.tool_calls(tool_calls);
                }
                result.push(args.build().map_err(build_err)?.into());
            }
            Role::User => {}
        }
    }

    Ok(result)
}

fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ChatCompletionTool> {
    tools
        .iter()
        .map(|t| ChatCompletionTool {
            r#type: ChatCompletionToolType::Function,
            function: FunctionObject {
                name: t.name.clone(),
                description: Some(t.description.clone()),
                parameters: Some(t.input_schema.clone()),
                strict: None,
            },
        })
        .collect()
}

fn stop_reason(reason: Option<FinishReason>) -> StopReason {
    match reason {
        Some(FinishReason::ToolCalls) | Some(FinishReason::FunctionCall) => StopReason::ToolUse,
        Some(FinishReason::Length) => StopReason::MaxTokens,
        Some(FinishReason::ContentFilter) => StopReason::Other("content_filter".to_string()),
        Some(FinishReason::Stop) | None => StopReason::EndTurn,
    }
}

#[async_trait]
impl ChatModel for OpenAIChat {
    #[instrument(skip(self, request), fields(model = %request.model, tools = request.tools.len()))]
    async fn create(&self, request: &ModelRequest) -> Result<ModelResponse> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model)
            .messages(to_api_messages(&request.system, &request.messages)?)
            .temperature(request.temperature)
            .max_completion_tokens(request.max_tokens);

        if !request.tools.is_empty() {
            args.tools(to_api_tools(&request.tools));
            if let Some(choice) = request.tool_choice {
                args.tool_choice(match choice {
                    ToolChoice::Auto => ChatCompletionToolChoiceOption::Auto,
                });
            }
        }

        let api_request = args.build().map_err(build_err)?;
        debug!("Sending {} messages", request.messages.len());

        let response = self
            .client
            .chat()
            .create(api_request)
            .await
            .map_err(|e| SyllabusError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SyllabusError::Llm("No response from model".to_string()))?;

        let mut content = Vec::new();
        if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
            content.push(ContentBlock::Text { text });
        }
        for call in choice.message.tool_calls.unwrap_or_default() {
            let input = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::String(call.function.arguments));
            content.push(ContentBlock::ToolUse {
                id: call.id,
                name: call.function.name,
                input,
            });
        }

        Ok(ModelResponse {
            content,
            stop_reason: stop_reason(choice.finish_reason),
        })
    }

    fn name(&self) -> &str {
        "openai"
    }
}
