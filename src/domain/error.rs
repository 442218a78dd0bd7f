use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("Schema violation in '{schema}': {message}")]
    SchemaViolation { schema: String, message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Tool execution failed: {tool} - {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Classification confidence {score} below threshold {threshold}")]
    LowConfidence { score: f64, threshold: f64 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn schema_violation(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            schema: schema.into(),
            message: message.into(),
        }
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    pub fn tool_execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    pub fn low_confidence(score: f64, threshold: f64) -> Self {
        Self::LowConfidence { score, threshold }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors that are isolated to a single tool call within the tool loop.
    ///
    /// These are converted to error-content tool messages so the model can
    /// react; everything else aborts the run.
    pub fn is_tool_local(&self) -> bool {
        matches!(
            self,
            Self::UnknownTool { .. } | Self::ToolExecution { .. } | Self::SchemaViolation { .. }
        )
    }
}
