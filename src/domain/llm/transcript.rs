//! Append-only conversation log with ordering enforcement
//!
//! The provider's tool-calling protocol requires that tool-result messages
//! directly follow the assistant message that issued the calls, one result
//! per call, in call order. The transcript enforces that at the append
//! boundary instead of leaving it to free-form vector mutation.

use std::collections::VecDeque;

use super::message::{Message, MessageRole};
use crate::domain::DomainError;

/// Ordered, append-only message sequence for one orchestration run
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
    /// Tool-call ids issued by the last assistant message, not yet answered,
    /// in issue order
    pending_calls: VecDeque<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a transcript from prior conversation history.
    ///
    /// Malformed history (dangling tool results, unanswered tool calls) is
    /// normalized to an empty sequence rather than failing the run.
    pub fn from_prior(prior: Vec<Message>) -> Self {
        let mut transcript = Self::new();
        for message in prior {
            if transcript.append(message).is_err() {
                return Self::new();
            }
        }
        if transcript.has_pending_calls() {
            return Self::new();
        }
        transcript
    }

    /// Append a message, enforcing the tool-call ordering invariant.
    ///
    /// - A tool message must answer the next unanswered call issued by the
    ///   preceding assistant message.
    /// - No other message may be appended while calls remain unanswered.
    pub fn append(&mut self, message: Message) -> Result<(), DomainError> {
        match message.role {
            MessageRole::Tool => {
                let call_id = message.tool_call_id.as_deref().ok_or_else(|| {
                    DomainError::internal("tool message without a tool_call_id")
                })?;

                match self.pending_calls.front() {
                    Some(expected) if expected == call_id => {
                        self.pending_calls.pop_front();
                    }
                    Some(expected) => {
                        return Err(DomainError::internal(format!(
                            "tool result out of order: expected '{}', got '{}'",
                            expected, call_id
                        )));
                    }
                    None => {
                        return Err(DomainError::internal(format!(
                            "tool result '{}' without a pending tool call",
                            call_id
                        )));
                    }
                }
            }
            _ => {
                if self.has_pending_calls() {
                    return Err(DomainError::internal(format!(
                        "{} unanswered tool call(s) before appending a {:?} message",
                        self.pending_calls.len(),
                        message.role
                    )));
                }

                if message.role == MessageRole::Assistant && message.has_tool_calls() {
                    self.pending_calls = message
                        .tool_calls
                        .iter()
                        .map(|c| c.id.clone())
                        .collect();
                }
            }
        }

        self.messages.push(message);
        Ok(())
    }

    pub fn has_pending_calls(&self) -> bool {
        !self.pending_calls.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_messages(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::llm::ToolCall;
    use serde_json::json;

    fn assistant_calling(ids: &[&str]) -> Message {
        let calls = ids
            .iter()
            .map(|id| ToolCall::new(*id, "get_weather", json!({})))
            .collect();
        Message::assistant_with_tool_calls(None, calls)
    }

    #[test]
    fn test_plain_appends() {
        let mut transcript = Transcript::new();
        transcript.append(Message::system("be helpful")).unwrap();
        transcript.append(Message::user("hello")).unwrap();
        transcript.append(Message::assistant("hi")).unwrap();

        assert_eq!(transcript.len(), 3);
        assert!(!transcript.has_pending_calls());
    }

    #[test]
    fn test_tool_results_in_call_order() {
        let mut transcript = Transcript::new();
        transcript.append(Message::user("weather?")).unwrap();
        transcript.append(assistant_calling(&["call_1", "call_2"])).unwrap();

        assert!(transcript.has_pending_calls());
        transcript.append(Message::tool("call_1", "sunny")).unwrap();
        transcript.append(Message::tool("call_2", "rainy")).unwrap();
        assert!(!transcript.has_pending_calls());
    }

    #[test]
    fn test_out_of_order_tool_result_rejected() {
        let mut transcript = Transcript::new();
        transcript.append(assistant_calling(&["call_1", "call_2"])).unwrap();

        let err = transcript
            .append(Message::tool("call_2", "rainy"))
            .unwrap_err();
        assert!(err.to_string().contains("out of order"));
    }

    #[test]
    fn test_dangling_tool_result_rejected() {
        let mut transcript = Transcript::new();
        let err = transcript
            .append(Message::tool("call_9", "orphaned"))
            .unwrap_err();
        assert!(err.to_string().contains("without a pending tool call"));
    }

    #[test]
    fn test_no_append_while_calls_pending() {
        let mut transcript = Transcript::new();
        transcript.append(assistant_calling(&["call_1"])).unwrap();

        let err = transcript.append(Message::user("ignore that")).unwrap_err();
        assert!(err.to_string().contains("unanswered tool call"));
    }

    #[test]
    fn test_from_prior_valid_history() {
        let prior = vec![Message::user("hi"), Message::assistant("hello")];
        let transcript = Transcript::from_prior(prior);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn test_from_prior_malformed_history_normalized_to_empty() {
        // Tool result with no originating assistant message
        let prior = vec![Message::tool("call_1", "stale")];
        assert!(Transcript::from_prior(prior).is_empty());

        // Unanswered tool calls at the end of history
        let prior = vec![assistant_calling(&["call_1"])];
        assert!(Transcript::from_prior(prior).is_empty());
    }
}
