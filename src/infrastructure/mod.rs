//! Infrastructure layer: provider transport, tool backends, logging

pub mod llm;
pub mod logging;
pub mod tools;
