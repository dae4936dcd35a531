//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use journal::JournalError;
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// A required request header is absent or empty.
    MissingHeader(&'static str),
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Saga execution error.
    Saga(SagaError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingHeader(name) => (
                StatusCode::BAD_REQUEST,
                format!("Missing required header: {name}"),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match &err {
        // Downstream rejected the request or stayed unavailable past the
        // retry budget
        SagaError::StepFailed { .. } | SagaError::SagaFailed { .. } => {
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        SagaError::Journal(JournalError::ConcurrencyConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downstream_failure_maps_to_bad_gateway() {
        let response = ApiError::Saga(SagaError::SagaFailed {
            reason: "invoice rejected".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response = ApiError::Saga(SagaError::StepFailed {
            step: "create_invoice".to_string(),
            reason: "invoice rejected".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn internal_saga_failure_maps_to_internal_server_error() {
        let response = ApiError::Saga(SagaError::Internal(
            "Journal error: storage offline".to_string(),
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn missing_header_maps_to_bad_request() {
        let response = ApiError::MissingHeader("x-acc-tenant-id").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
