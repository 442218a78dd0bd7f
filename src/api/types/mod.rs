pub mod error;
pub mod json;
pub mod workflow;

pub use error::{ApiError, ApiErrorResponse, ApiErrorType};
pub use json::Json;
pub use workflow::{ExecuteWorkflowRequest, ExecuteWorkflowResponse};
