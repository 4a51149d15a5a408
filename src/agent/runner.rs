//! Agent runner with a bounded tool-calling loop.

use super::tools::ToolRegistry;
use crate::config::{prompts, LlmSettings};
use crate::error::Result;
use crate::llm::{
    ChatModel, ContentBlock, Message, ModelRequest, ModelResponse, ToolChoice, ToolDefinition,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Agent that answers a query, calling tools for at most `max_rounds`
/// rounds before a final tools-disabled call.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    model_name: String,
    temperature: f32,
    max_tokens: u32,
    max_rounds: usize,
    system_prompt: String,
}

impl Agent {
    /// Create an agent from LLM settings, using the built-in system prompt.
    pub fn new(model: Arc<dyn ChatModel>, settings: &LlmSettings) -> Self {
        Self {
            model,
            model_name: settings.model.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_rounds: settings.max_rounds,
            system_prompt: prompts::system_prompt(settings.max_rounds),
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    fn request(
        &self,
        system: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
    ) -> ModelRequest {
        ModelRequest {
            model: self.model_name.clone(),
            system: system.to_string(),
            messages: messages.to_vec(),
            tools: tools.to_vec(),
            tool_choice: (!tools.is_empty()).then_some(ToolChoice::Auto),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Run the loop for one query.
    ///
    /// Each round either ends with a direct answer or runs every requested
    /// tool in order. A failed tool call ends tool use for the query. Once
    /// tool use ends, one more call is made with tools disabled and its
    /// text is the answer. Model errors propagate.
    #[instrument(skip(self, query, history, tools), fields(max_rounds = self.max_rounds))]
    pub async fn run(
        &self,
        query: &str,
        history: Option<&str>,
        tools: &ToolRegistry,
    ) -> Result<AgentResponse> {
        let system = prompts::with_history(&self.system_prompt, history);
        let definitions = tools.definitions();
        let mut messages = vec![Message::user(query)];
        let mut tool_calls = Vec::new();
        let mut model_calls = 0;

        for round in 1..=self.max_rounds {
            debug!("Agent round {}", round);

            model_calls += 1;
            let response = self
                .model
                .create(&self.request(&system, &messages, &definitions))
                .await?;

            if !response.requests_tools() {
                return Ok(AgentResponse::from_model(&response, tool_calls, model_calls));
            }

            let mut results = Vec::new();
            let mut failed = false;

            for call in response.tool_uses() {
                info!("Agent calling tool: {} with args: {}", call.name, call.input);

                let (content, is_error) = match tools.execute(call.name, call.input).await {
                    Ok(output) => (output, false),
                    Err(e) => {
                        warn!("Tool {} failed: {}", call.name, e);
                        failed = true;
                        (format!("Tool execution failed: {}", e), true)
                    }
                };

                tool_calls.push(ToolCallRecord {
                    name: call.name.to_string(),
                    arguments: call.input.clone(),
                    result: content.clone(),
                    is_error,
                });
                results.push(ContentBlock::ToolResult {
                    tool_use_id: call.id.to_string(),
                    content,
                    is_error,
                });
            }

            messages.push(Message::assistant(response.content.clone()));
            messages.push(Message::tool_results(results));

            if failed {
                debug!("Tool failure in round {}, finishing without tools", round);
                break;
            }
        }

        let response = self.model.create(&self.request(&system, &messages, &[])).await?;
        Ok(AgentResponse::from_model(&response, tool_calls, model_calls + 1))
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final answer text.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model calls made.
    pub model_calls: usize,
}

impl AgentResponse {
    fn from_model(
        response: &ModelResponse,
        tool_calls: Vec<ToolCallRecord>,
        model_calls: usize,
    ) -> Self {
        Self {
            content: response.text().to_string(),
            tool_calls,
            model_calls,
        }
    }
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub name: String,
    pub arguments: Value,
    pub result: String,
    pub is_error: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
