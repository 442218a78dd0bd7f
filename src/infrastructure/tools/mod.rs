//! Tool executors backed by external services and bundled data

pub mod knowledge_base;
pub mod weather;

pub use knowledge_base::KnowledgeBaseTool;
pub use weather::WeatherTool;
