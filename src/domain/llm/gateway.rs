use std::fmt::Debug;

use async_trait::async_trait;

use super::{LlmRequest, Message, ModelTurn};
use crate::domain::schema::{SchemaDef, StructuredExtraction};
use crate::domain::DomainError;

/// Single abstraction over the hosted model provider.
///
/// Guarantees of `request_structured`: the returned extraction conforms to
/// the given contract, or a `SchemaViolation` is raised. It is never retried
/// here; the caller decides whether to abort or fall back.
#[async_trait]
pub trait ModelGateway: Send + Sync + Debug {
    /// Free-text completion, with tool calling enabled when the request
    /// carries tool specs
    async fn request_free(&self, model: &str, request: LlmRequest)
        -> Result<ModelTurn, DomainError>;

    /// Structured output conforming to `schema`
    async fn request_structured(
        &self,
        model: &str,
        messages: Vec<Message>,
        schema: &SchemaDef,
    ) -> Result<StructuredExtraction, DomainError>;

    /// Provider name, for logging and error attribution
    fn gateway_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::Value;

    use super::*;

    /// Scripted gateway for orchestration tests.
    ///
    /// Free-text turns are consumed from a queue; when the queue is empty a
    /// configured repeating turn (if any) is served, which makes "the model
    /// never stops calling tools" scenarios easy to script. Structured
    /// replies are queued per schema name and validated through the real
    /// contract before being returned.
    #[derive(Debug, Default)]
    pub struct MockModelGateway {
        free_turns: Mutex<VecDeque<Result<ModelTurn, DomainError>>>,
        repeating_turn: Mutex<Option<ModelTurn>>,
        structured_replies: Mutex<HashMap<String, VecDeque<Result<Value, DomainError>>>>,
        structured_delays: Mutex<HashMap<String, Duration>>,
        free_calls: AtomicUsize,
        structured_calls: AtomicUsize,
        tools_enabled_log: Mutex<Vec<bool>>,
    }

    impl MockModelGateway {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_free_turn(self, turn: ModelTurn) -> Self {
            self.free_turns.lock().unwrap().push_back(Ok(turn));
            self
        }

        pub fn with_free_error(self, error: DomainError) -> Self {
            self.free_turns.lock().unwrap().push_back(Err(error));
            self
        }

        /// Serve this turn whenever the scripted queue is exhausted
        pub fn with_repeating_turn(self, turn: ModelTurn) -> Self {
            *self.repeating_turn.lock().unwrap() = Some(turn);
            self
        }

        pub fn with_structured_reply(self, schema: impl Into<String>, value: Value) -> Self {
            self.structured_replies
                .lock()
                .unwrap()
                .entry(schema.into())
                .or_default()
                .push_back(Ok(value));
            self
        }

        pub fn with_structured_error(self, schema: impl Into<String>, error: DomainError) -> Self {
            self.structured_replies
                .lock()
                .unwrap()
                .entry(schema.into())
                .or_default()
                .push_back(Err(error));
            self
        }

        /// Delay structured replies for one schema, to exercise join behavior
        pub fn with_structured_delay(self, schema: impl Into<String>, delay: Duration) -> Self {
            self.structured_delays
                .lock()
                .unwrap()
                .insert(schema.into(), delay);
            self
        }

        pub fn free_call_count(&self) -> usize {
            self.free_calls.load(Ordering::SeqCst)
        }

        pub fn structured_call_count(&self) -> usize {
            self.structured_calls.load(Ordering::SeqCst)
        }

        pub fn total_call_count(&self) -> usize {
            self.free_call_count() + self.structured_call_count()
        }

        /// Whether tools were enabled, per free call, in call order
        pub fn tools_enabled_log(&self) -> Vec<bool> {
            self.tools_enabled_log.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ModelGateway for MockModelGateway {
        async fn request_free(
            &self,
            _model: &str,
            request: LlmRequest,
        ) -> Result<ModelTurn, DomainError> {
            self.free_calls.fetch_add(1, Ordering::SeqCst);
            self.tools_enabled_log
                .lock()
                .unwrap()
                .push(request.tools_enabled());

            if let Some(scripted) = self.free_turns.lock().unwrap().pop_front() {
                return scripted;
            }

            if let Some(turn) = self.repeating_turn.lock().unwrap().clone() {
                return Ok(turn);
            }

            Err(DomainError::provider("mock", "no scripted turn left"))
        }

        async fn request_structured(
            &self,
            _model: &str,
            _messages: Vec<Message>,
            schema: &SchemaDef,
        ) -> Result<StructuredExtraction, DomainError> {
            self.structured_calls.fetch_add(1, Ordering::SeqCst);

            let delay = self
                .structured_delays
                .lock()
                .unwrap()
                .get(schema.name())
                .copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let scripted = self
                .structured_replies
                .lock()
                .unwrap()
                .get_mut(schema.name())
                .and_then(VecDeque::pop_front);

            match scripted {
                Some(Ok(value)) => StructuredExtraction::validated(schema, value),
                Some(Err(error)) => Err(error),
                None => Err(DomainError::provider(
                    "mock",
                    format!("no scripted reply for schema '{}'", schema.name()),
                )),
            }
        }

        fn gateway_name(&self) -> &'static str {
            "mock"
        }
    }
}
