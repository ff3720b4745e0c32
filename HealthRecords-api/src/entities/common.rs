use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use health_records_domain::services::{LabResultsServiceError, VitalsServiceError};

/// Error response format for API
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error type/code - machine-readable identifier
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Create a not found error response
    pub fn not_found(message: &str) -> Self {
        Self {
            error: "not_found".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create a validation error response
    pub fn validation_error(message: &str, details: Option<serde_json::Value>) -> Self {
        Self {
            error: "validation_error".to_string(),
            message: message.to_string(),
            details,
        }
    }

    /// Create a bad request error response
    pub fn bad_request(message: &str) -> Self {
        Self {
            error: "bad_request".to_string(),
            message: message.to_string(),
            details: None,
        }
    }

    /// Create an internal error response
    pub fn internal_error() -> Self {
        Self {
            error: "internal_error".to_string(),
            message: "An unexpected error occurred".to_string(),
            details: None,
        }
    }

    /// HTTP status for this error code
    pub fn status_code(&self) -> StatusCode {
        match self.error.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "validation_error" | "bad_request" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

impl From<VitalsServiceError> for ErrorResponse {
    fn from(err: VitalsServiceError) -> Self {
        match err {
            VitalsServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            other => {
                error!("Vitals service failure: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

impl From<LabResultsServiceError> for ErrorResponse {
    fn from(err: LabResultsServiceError) -> Self {
        match err {
            LabResultsServiceError::ValidationError(msg) => ErrorResponse::validation_error(&msg, None),
            LabResultsServiceError::NotFound(msg) => ErrorResponse::not_found(&msg),
            other => {
                error!("Lab results service failure: {}", other);
                ErrorResponse::internal_error()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ErrorResponse::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorResponse::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorResponse::validation_error("x", None).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorResponse::internal_error().status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_map_to_codes() {
        let response: ErrorResponse = LabResultsServiceError::NotFound("Lab result with ID x not found".into()).into();
        assert_eq!(response.error, "not_found");

        let response: ErrorResponse = VitalsServiceError::ValidationError("bad".into()).into();
        assert_eq!(response.error, "validation_error");
        assert_eq!(response.message, "bad");

        // Storage details are not leaked to clients
        let response: ErrorResponse = VitalsServiceError::RepositoryError("disk I/O error".into()).into();
        assert_eq!(response.error, "internal_error");
        assert!(!response.message.contains("disk"));
    }
}
