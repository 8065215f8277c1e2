use crate::schemas::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

/// Every mutation path either succeeds with the updated entity or fails
/// with exactly one of these kinds and a human-readable reason.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range field; surfaced as field-level feedback.
    #[error("{0}")]
    Validation(String),
    /// Policy denial; the message never exposes more than the refused action.
    #[error(transparent)]
    Authorization(#[from] policy::Denial),
    #[error("{0}")]
    NotFound(String),
    /// Operation invalid for the incident's current status.
    #[error("{0}")]
    InvalidState(String),
    /// Missing or unresolvable actor identity.
    #[error("{0}")]
    Unauthenticated(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Authorization(_) => (StatusCode::FORBIDDEN, "NOT_AUTHORIZED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::InvalidState(_) => (StatusCode::CONFLICT, "INVALID_STATE"),
            ApiError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
            ApiError::Database(_) | ApiError::Storage(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal failures are logged in full and surfaced generically.
        let message = match &self {
            ApiError::Database(e) => {
                error!("Database failure: {}", e);
                "Internal server error.".to_string()
            }
            ApiError::Storage(e) => {
                error!("Media storage failure: {}", e);
                "Internal server error.".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}
