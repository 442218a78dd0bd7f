use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::arguments::ToolArguments;
use crate::domain::llm::{Message, ToolCall, ToolSpec};
use crate::domain::schema::SchemaRegistry;
use crate::domain::DomainError;

/// An external capability the model may invoke
#[async_trait]
pub trait ToolExecutor: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for the tool's parameters, shown to the model
    fn parameters_schema(&self) -> Value;

    /// Name of the registered contract the result must conform to
    fn result_schema(&self) -> &'static str;

    async fn execute(&self, args: ToolArguments) -> Result<Value, DomainError>;
}

/// Outcome status of one tool invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResultStatus {
    Success,
    Error,
}

/// Result of one tool invocation, tied to the originating call id.
///
/// Immutable after creation; consumed exactly once to build the tool message
/// fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub for_id: String,
    pub payload: Value,
    pub status: ToolResultStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl ToolResult {
    pub fn success(for_id: impl Into<String>, payload: Value) -> Self {
        Self {
            for_id: for_id.into(),
            payload,
            status: ToolResultStatus::Success,
            error_detail: None,
        }
    }

    pub fn error(for_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            for_id: for_id.into(),
            payload: Value::Null,
            status: ToolResultStatus::Error,
            error_detail: Some(detail.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == ToolResultStatus::Error
    }

    /// Consume the result into the tool message answering its call
    pub fn into_message(self) -> Message {
        let content = match self.status {
            ToolResultStatus::Success => {
                serde_json::to_string(&self.payload).unwrap_or_else(|_| "null".to_string())
            }
            ToolResultStatus::Error => format!(
                "Error: {}",
                self.error_detail.as_deref().unwrap_or("tool failed")
            ),
        };
        Message::tool(self.for_id, content)
    }
}

/// Registry of named tools with their executor bindings
#[derive(Debug, Default)]
pub struct ToolCatalog {
    tools: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, executor: Arc<dyn ToolExecutor>) {
        self.tools.insert(executor.name().to_string(), executor);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolExecutor>> {
        self.tools.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Provider-facing specs for every registered tool
    pub fn specs(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .values()
            .map(|t| ToolSpec::new(t.name(), t.description(), t.parameters_schema()))
            .collect();
        // Deterministic ordering for prompts and tests
        specs.sort_by(|a, b| a.name.cmp(&b.name));
        specs
    }

    /// Execute one model-issued call: look up the executor, normalize the
    /// arguments, run it, and validate the result against its declared
    /// contract.
    ///
    /// Every failure mode here is tool-local (`UnknownTool`,
    /// `ToolExecution`, result `SchemaViolation`); the caller converts it to
    /// an error-content tool message instead of aborting the run.
    pub async fn execute_call(
        &self,
        call: &ToolCall,
        registry: &SchemaRegistry,
    ) -> Result<Value, DomainError> {
        let executor = self
            .get(&call.name)
            .ok_or_else(|| DomainError::unknown_tool(&call.name))?;

        let args = ToolArguments::from_value(call.arguments.clone())
            .map_err(|e| DomainError::tool_execution(&call.name, e.to_string()))?;

        let payload = executor.execute(args).await.map_err(|e| {
            if e.is_tool_local() {
                e
            } else {
                DomainError::tool_execution(&call.name, e.to_string())
            }
        })?;

        let schema = registry.require(executor.result_schema()).map_err(|e| {
            DomainError::tool_execution(&call.name, e.to_string())
        })?;
        schema.validate(&payload)?;

        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::names;
    use serde_json::json;

    #[derive(Debug)]
    struct EchoAnswerTool {
        reply: Value,
    }

    #[async_trait]
    impl ToolExecutor for EchoAnswerTool {
        fn name(&self) -> &'static str {
            "echo_answer"
        }

        fn description(&self) -> &'static str {
            "Returns a canned knowledge-base answer"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        fn result_schema(&self) -> &'static str {
            names::KB_ANSWER
        }

        async fn execute(&self, _args: ToolArguments) -> Result<Value, DomainError> {
            Ok(self.reply.clone())
        }
    }

    #[derive(Debug)]
    struct FailingTool;

    #[async_trait]
    impl ToolExecutor for FailingTool {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn description(&self) -> &'static str {
            "Always fails"
        }

        fn parameters_schema(&self) -> Value {
            json!({"type": "object", "properties": {}})
        }

        fn result_schema(&self) -> &'static str {
            names::KB_ANSWER
        }

        async fn execute(&self, _args: ToolArguments) -> Result<Value, DomainError> {
            Err(DomainError::provider("upstream", "connection refused"))
        }
    }

    fn catalog_with(executor: Arc<dyn ToolExecutor>) -> ToolCatalog {
        let mut catalog = ToolCatalog::new();
        catalog.register(executor);
        catalog
    }

    #[tokio::test]
    async fn test_execute_call_success() {
        let catalog = catalog_with(Arc::new(EchoAnswerTool {
            reply: json!({"found": true, "answer": "30 days"}),
        }));
        let registry = SchemaRegistry::with_defaults();
        let call = ToolCall::new("call_1", "echo_answer", json!({}));

        let payload = catalog.execute_call(&call, &registry).await.unwrap();
        assert_eq!(payload["answer"], "30 days");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_tool_local() {
        let catalog = ToolCatalog::new();
        let registry = SchemaRegistry::with_defaults();
        let call = ToolCall::new("call_1", "no_such_tool", json!({}));

        let err = catalog.execute_call(&call, &registry).await.unwrap_err();
        assert!(matches!(err, DomainError::UnknownTool { .. }));
        assert!(err.is_tool_local());
    }

    #[tokio::test]
    async fn test_executor_failure_wrapped_as_tool_execution() {
        let catalog = catalog_with(Arc::new(FailingTool));
        let registry = SchemaRegistry::with_defaults();
        let call = ToolCall::new("call_1", "broken", json!({}));

        let err = catalog.execute_call(&call, &registry).await.unwrap_err();
        assert!(matches!(err, DomainError::ToolExecution { .. }));
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_nonconforming_result_is_schema_violation() {
        let catalog = catalog_with(Arc::new(EchoAnswerTool {
            reply: json!({"answer": "missing the found flag"}),
        }));
        let registry = SchemaRegistry::with_defaults();
        let call = ToolCall::new("call_1", "echo_answer", json!({}));

        let err = catalog.execute_call(&call, &registry).await.unwrap_err();
        assert!(matches!(err, DomainError::SchemaViolation { .. }));
        assert!(err.is_tool_local());
    }

    #[test]
    fn test_specs_are_sorted() {
        let mut catalog = ToolCatalog::new();
        catalog.register(Arc::new(FailingTool));
        catalog.register(Arc::new(EchoAnswerTool { reply: json!({}) }));

        let names: Vec<String> = catalog.specs().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["broken", "echo_answer"]);
    }

    #[test]
    fn test_tool_result_messages() {
        let ok = ToolResult::success("call_1", json!({"found": true}));
        let message = ok.into_message();
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(message.content_text(), Some("{\"found\":true}"));

        let failed = ToolResult::error("call_2", "boom");
        assert!(failed.is_error());
        let message = failed.into_message();
        assert_eq!(message.content_text(), Some("Error: boom"));
    }
}
