//! Bounded execution of model-requested tool calls
//!
//! State machine: AwaitingModel -> Terminal when the model returns no calls,
//! or AwaitingModel -> ExecutingTools -> AwaitingModel otherwise, with a hard
//! exit to Terminal at the iteration bound via one final tools-disabled call.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use super::run::WorkflowRun;
use crate::domain::llm::{LlmRequest, ModelGateway};
use crate::domain::schema::SchemaRegistry;
use crate::domain::tool::{ToolCatalog, ToolResult};
use crate::domain::DomainError;

/// Executes tool calls against the catalog in a bounded loop
#[derive(Debug)]
pub struct ToolExecutionLoop {
    gateway: Arc<dyn ModelGateway>,
    catalog: Arc<ToolCatalog>,
    registry: Arc<SchemaRegistry>,
    max_iterations: u32,
}

impl ToolExecutionLoop {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        catalog: Arc<ToolCatalog>,
        registry: Arc<SchemaRegistry>,
        max_iterations: u32,
    ) -> Self {
        Self {
            gateway,
            catalog,
            registry,
            max_iterations,
        }
    }

    /// Drive the loop over the run's transcript until a terminal text
    /// response is reached.
    ///
    /// Each iteration is one tools-enabled gateway call. Per-tool failures
    /// are isolated: a failing call produces an error-content tool message
    /// but stops neither its siblings nor the loop.
    pub async fn run(&self, model: &str, run: &mut WorkflowRun) -> Result<String, DomainError> {
        let specs = self.catalog.specs();

        while run.next_iteration() <= self.max_iterations {
            let request = LlmRequest::builder()
                .messages(run.transcript().to_messages())
                .tools(specs.clone())
                .build();

            let turn = self.gateway.request_free(model, request).await?;
            run.absorb_usage(turn.usage);

            if !turn.has_tool_calls() {
                let text = turn.text.clone().unwrap_or_default();
                run.transcript_mut().append(turn.to_assistant_message())?;
                debug!(iterations = run.iterations(), "tool loop reached terminal text");
                return Ok(text);
            }

            // The assistant message carrying the calls must land before any
            // tool result; the transcript enforces the rest of the ordering.
            run.transcript_mut().append(turn.to_assistant_message())?;

            for call in &turn.tool_calls {
                let result = match self.catalog.execute_call(call, &self.registry).await {
                    Ok(payload) => {
                        run.trace_step(
                            format!("tool '{}' succeeded", call.name),
                            json!({"call_id": call.id, "payload": payload}),
                        );
                        ToolResult::success(&call.id, payload)
                    }
                    Err(error) if error.is_tool_local() => {
                        warn!(tool = %call.name, %error, "tool call failed; continuing");
                        run.trace_step(
                            format!("tool '{}' failed", call.name),
                            json!({"call_id": call.id, "error": error.to_string()}),
                        );
                        ToolResult::error(&call.id, error.to_string())
                    }
                    Err(error) => return Err(error),
                };

                run.transcript_mut().append(result.into_message())?;
            }
        }

        // Iteration bound reached: force a terminal answer with tools off
        warn!(
            max_iterations = self.max_iterations,
            "tool loop hit iteration bound; forcing final response"
        );
        let request = LlmRequest::builder()
            .messages(run.transcript().to_messages())
            .build();
        let turn = self.gateway.request_free(model, request).await?;
        run.absorb_usage(turn.usage);

        let text = turn.text.clone().unwrap_or_default();
        run.transcript_mut().append(turn.to_assistant_message())?;
        Ok(text)
    }
}
