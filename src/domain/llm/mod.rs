//! Conversation model and the gateway abstraction over the hosted provider

mod gateway;
mod message;
mod request;
mod response;
mod transcript;

pub use gateway::ModelGateway;
pub use message::{Message, MessageRole, ToolCall};
pub use request::{JsonSchemaFormat, LlmRequest, LlmRequestBuilder, ToolSpec};
pub use response::{FinishReason, ModelTurn, Usage};
pub use transcript::Transcript;

#[cfg(test)]
pub use gateway::mock;
