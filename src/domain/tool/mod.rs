//! Named external capabilities with declared schemas and executor bindings

mod arguments;
mod catalog;

pub use arguments::ToolArguments;
pub use catalog::{ToolCatalog, ToolExecutor, ToolResult, ToolResultStatus};
