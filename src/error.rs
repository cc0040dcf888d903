use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the API core. Ownership mismatches surface as
/// `NotFound` so a client cannot probe which ids exist under other
/// accounts, and authentication failures never say whether the username
/// existed.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Login required. Request a token and retry with bearer credentials")]
    TokenRequired,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::AuthenticationFailed => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::TokenRequired => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Database(err) => {
                tracing::error!(error = %err, "database failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something bad happened while talking to the database".to_string(),
                )
            }
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let error_response = json!({
            "status": if status.is_server_error() { "error" } else { "fail" },
            "message": message,
        });
        (status, Json(error_response)).into_response()
    }
}
