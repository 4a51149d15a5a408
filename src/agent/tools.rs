//! Tool contract, argument validation, and the tool registry.

use crate::llm::ToolDefinition;
use crate::models::Citation;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::debug;

/// Errors raised while dispatching or running a tool.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool '{0}' not found")]
    NotFound(String),

    #[error("Invalid arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("{0}")]
    Execution(String),
}

/// A capability the agent can invoke by name.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and argument schema.
    fn definition(&self) -> ToolDefinition;

    /// Run the tool on arguments already checked against its schema.
    async fn execute(&self, args: &Value) -> Result<String, ToolError>;

    /// Citations from this tool's most recent run.
    fn last_sources(&self) -> Vec<Citation> {
        Vec::new()
    }

    /// Forget held citations.
    fn reset_sources(&self) {}
}

/// Citation list held by a tool between its run and the caller draining it.
#[derive(Debug, Default)]
pub struct SourceSlot(Mutex<Vec<Citation>>);

impl SourceSlot {
    fn lock(&self) -> MutexGuard<'_, Vec<Citation>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the held list.
    pub fn replace(&self, sources: Vec<Citation>) {
        *self.lock() = sources;
    }

    pub fn get(&self) -> Vec<Citation> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

/// Deserialize validated arguments into a tool's typed argument struct.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: &Value) -> Result<T, ToolError> {
    serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

/// Check arguments against a JSON schema's `required`, `properties[*].type`
/// and `additionalProperties: false`.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<(), String> {
    let Some(object) = args.as_object() else {
        return Err(format!("expected an object, got {}", args));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(format!("missing required field '{}'", name))
                }
                Some(_) => {}
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (name, value) in object {
        let Some(property) = properties.and_then(|p| p.get(name)) else {
            if closed {
                return Err(format!("unexpected field '{}'", name));
            }
            continue;
        };
        if value.is_null() {
            continue;
        }
        if let Some(expected) = property.get("type").and_then(Value::as_str) {
            if !type_matches(expected, value) {
                return Err(format!("field '{}' must be of type {}", name, expected));
            }
        }
    }

    Ok(())
}

fn type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

/// Name-keyed set of tools, in registration order.
///
/// Citations are tracked per tool: a tool's next run replaces its own list.
/// [`last_sources`](Self::last_sources) merges the lists of every tool that
/// currently holds any, in registration order, so a round that calls two
/// different tools reports both.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.definition().name;
        match self.tools.iter().position(|t| t.definition().name == name) {
            Some(i) => self.tools[i] = tool,
            None => self.tools.push(tool),
        }
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.definition().name == name)
    }

    /// Schemas of every registered tool.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    /// Validate arguments and run the named tool.
    pub async fn execute(&self, name: &str, args: &Value) -> Result<String, ToolError> {
        let tool = self
            .find(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        validate_arguments(&tool.definition().input_schema, args).map_err(|reason| {
            ToolError::InvalidArguments {
                tool: name.to_string(),
                reason,
            }
        })?;

        debug!("Executing tool {} with {}", name, args);
        tool.execute(args).await
    }

    /// Citations held by all tools.
    pub fn last_sources(&self) -> Vec<Citation> {
        self.tools.iter().flat_map(|t| t.last_sources()).collect()
    }

    /// Clear every tool's citations.
    pub fn reset_sources(&self) {
        for tool in &self.tools {
            tool.reset_sources();
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool {
        name: &'static str,
        sources: SourceSlot,
    }

    impl EchoTool {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                sources: SourceSlot::default(),
            }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn definition(&self) -> ToolDefinition {
            ToolDefinition {
                name: self.name.to_string(),
                description: "Echo".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "text": {"type": "string"},
                        "times": {"type": "integer"}
                    },
                    "required": ["text"]
                }),
            }
        }

        async fn execute(&self, args: &Value) -> Result<String, ToolError> {
            let text = args["text"].as_str().unwrap_or_default().to_string();
            if text == "fail" {
                return Err(ToolError::Execution("echo failed".to_string()));
            }
            self.sources
                .replace(vec![Citation::new(format!("{} {}", self.name, text), None)]);
            Ok(text)
        }

        fn last_sources(&self) -> Vec<Citation> {
            self.sources.get()
        }

        fn reset_sources(&self) {
            self.sources.clear();
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new("first")));
        registry.register(Arc::new(EchoTool::new("second")));
        registry
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.definitions()[1].name, "second");

        let out = registry.execute("first", &json!({"text": "hello"})).await.unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_distinct_from_execution_error() {
        let registry = registry();

        let err = registry.execute("missing", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref n) if n == "missing"));
        assert_eq!(err.to_string(), "Tool 'missing' not found");

        let err = registry.execute("first", &json!({"text": "fail"})).await.unwrap_err();
        assert!(matches!(err, ToolError::Execution(_)));
    }

    #[tokio::test]
    async fn test_arguments_validated_before_dispatch() {
        let registry = registry();

        let err = registry.execute("first", &json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));

        let err = registry
            .execute("first", &json!({"text": "a", "times": "two"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("times"));

        // Nothing ran, so nothing was cited.
        assert!(registry.last_sources().is_empty());
    }

    #[tokio::test]
    async fn test_sources_last_write_wins_per_tool_and_merge_across_tools() {
        let registry = registry();

        registry.execute("first", &json!({"text": "a"})).await.unwrap();
        registry.execute("first", &json!({"text": "b"})).await.unwrap();
        let texts: Vec<_> = registry.last_sources().into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["first b"]);

        registry.execute("second", &json!({"text": "c"})).await.unwrap();
        let texts: Vec<_> = registry.last_sources().into_iter().map(|c| c.text).collect();
        assert_eq!(texts, vec!["first b", "second c"]);

        registry.reset_sources();
        assert!(registry.last_sources().is_empty());
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry();
        registry.register(Arc::new(EchoTool::new("first")));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_validate_arguments() {
        let schema = json!({
            "type": "object",
            "properties": {"n": {"type": "integer"}},
            "required": [],
            "additionalProperties": false
        });

        assert!(validate_arguments(&schema, &json!({"n": 3})).is_ok());
        assert!(validate_arguments(&schema, &json!({"n": null})).is_ok());
        assert!(validate_arguments(&schema, &json!({"n": 1.5})).is_err());
        assert!(validate_arguments(&schema, &json!({"other": 1})).is_err());
        assert!(validate_arguments(&schema, &json!("text")).is_err());
    }
}
