//! JSON error envelope shared by every endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Categorical error type reported to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorType {
    InvalidRequestError,
    NotFoundError,
    ProviderError,
    SchemaError,
    ServerError,
}

impl std::fmt::Display for ApiErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRequestError => write!(f, "invalid_request_error"),
            Self::NotFoundError => write!(f, "not_found_error"),
            Self::ProviderError => write!(f, "provider_error"),
            Self::SchemaError => write!(f, "schema_error"),
            Self::ServerError => write!(f, "server_error"),
        }
    }
}

/// Error body: `{"success": false, "error": ..., "error_type": ...}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_type: ApiErrorType,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: ApiErrorType, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                success: false,
                error: message.into(),
                error_type,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ApiErrorType::InvalidRequestError,
            message,
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, ApiErrorType::NotFoundError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiErrorType::ServerError,
            message,
        )
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorType::ProviderError,
            message,
        )
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, ApiErrorType::SchemaError, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let message = err.to_string();
        match err {
            DomainError::InvalidInput { .. } => Self::bad_request(message),
            DomainError::UnknownTool { .. } => Self::bad_request(message),
            DomainError::Provider { .. } => Self::unavailable(message),
            // A schema violation at this level means the provider returned
            // nonconforming output that no stage could absorb
            DomainError::SchemaViolation { .. } => Self::bad_gateway(message),
            DomainError::ToolExecution { .. }
            | DomainError::LowConfidence { .. }
            | DomainError::Configuration { .. }
            | DomainError::Internal { .. } => Self::internal(message),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.response.error_type, self.response.error
        )
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_creation() {
        let err = ApiError::bad_request("input must not be empty");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error_type, ApiErrorType::InvalidRequestError);
        assert!(!err.response.success);
    }

    #[test]
    fn test_domain_error_status_mapping() {
        let err: ApiError = DomainError::invalid_input("empty").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = DomainError::provider("openai", "timeout").into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);

        let err: ApiError = DomainError::schema_violation("route-decision", "bad").into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err: ApiError = DomainError::internal("boom").into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_envelope_serialization() {
        let err = ApiError::bad_request("input must not be empty");
        let json = serde_json::to_string(&err.response).unwrap();

        assert!(json.contains("\"success\":false"));
        assert!(json.contains("invalid_request_error"));
        assert!(json.contains("input must not be empty"));
    }
}
