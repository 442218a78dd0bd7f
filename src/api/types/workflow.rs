//! Request/response bodies for workflow execution

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ApiError;
use crate::domain::llm::Message;
use crate::domain::workflow::{WorkflowKind, WorkflowOutcome};

/// Body of `POST /v1/workflows/{workflow}/execute`.
///
/// `text` is the new input; `messages` optionally carries prior conversation
/// history. When `text` is absent the trailing user message is taken as the
/// input instead.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteWorkflowRequest {
    pub text: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub model: Option<String>,
    /// Include the step-by-step trace in the response
    #[serde(default)]
    pub debug: bool,
}

impl ExecuteWorkflowRequest {
    /// Split into (input text, prior history)
    pub fn into_parts(self) -> Result<(String, Vec<Message>, Option<String>, bool), ApiError> {
        let Self {
            text,
            mut messages,
            model,
            debug,
        } = self;

        if let Some(text) = text {
            return Ok((text, messages, model, debug));
        }

        let trailing_user = matches!(
            messages.last(),
            Some(message) if message.role == crate::domain::llm::MessageRole::User
        );
        if trailing_user {
            let input = messages
                .pop()
                .and_then(|m| m.content)
                .unwrap_or_default();
            return Ok((input, messages, model, debug));
        }

        Err(ApiError::bad_request(
            "request needs 'text' or a trailing user message in 'messages'",
        ))
    }
}

/// Success body mirroring the workflow's terminal outcome
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteWorkflowResponse {
    pub success: bool,
    pub request_id: Uuid,
    pub workflow: WorkflowKind,
    #[serde(flatten)]
    pub result: WorkflowOutcome,
}

impl ExecuteWorkflowResponse {
    pub fn new(
        request_id: Uuid,
        workflow: WorkflowKind,
        mut result: WorkflowOutcome,
        debug: bool,
    ) -> Self {
        if !debug {
            result.trace.clear();
        }
        Self {
            success: true,
            request_id,
            workflow,
            result,
        }
    }
}
