//! Domain layer: orchestration logic independent of transport and provider

pub mod classification;
pub mod error;
pub mod knowledge_base;
pub mod llm;
pub mod schema;
pub mod tool;
pub mod workflow;

pub use error::DomainError;
