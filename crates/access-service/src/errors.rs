use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Service-level error taxonomy.
///
/// Redemption outcomes (wrong email, expired link, spent session) are NOT
/// errors — they are values of [`crate::models::Outcome`] and travel through
/// the normal response path. Only malformed creation input and genuine
/// malfunctions end up here.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Exhausted token generation retries")]
    ExhaustedRetries,

    #[error("Storage error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AccessError::InvalidInput(reason) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", reason.clone())
            }
            AccessError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            AccessError::NotFound(reason) => (StatusCode::NOT_FOUND, "NOT_FOUND", reason.clone()),
            // Generic messages below: internal details are logged
            // server-side, never returned to callers.
            AccessError::ExhaustedRetries => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "TOKEN_GENERATION_FAILED",
                "Failed to generate a unique access token".to_string(),
            ),
            AccessError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "An internal storage error occurred".to_string(),
            ),
            AccessError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_400() {
        let response = AccessError::InvalidInput("missing email".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AccessError::NotFound("no such session".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_store_error_is_generic_500() {
        let response = AccessError::Store("connection refused to 10.0.0.7".to_string());
        let response = response.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_exhausted_retries_maps_to_500() {
        let response = AccessError::ExhaustedRetries.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
