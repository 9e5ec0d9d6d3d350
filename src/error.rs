//! Error types for chirp
//!
//! All errors in the application are converted to `AppError`,
//! which implements `IntoResponse` for proper HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. It implements `IntoResponse` to
/// automatically convert errors to appropriate HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found (404)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authentication required (401)
    #[error("{0}")]
    Unauthorized(&'static str),

    /// Access denied (403)
    #[error("Access denied")]
    Forbidden,

    /// Validation error or duplicate action (400)
    #[error("{0}")]
    Validation(String),

    /// Database error (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP client error (502)
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Emotion classifier answered with something unusable (502)
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Password hashing / token signing error (500)
    #[error("Encryption error: {0}")]
    Encryption(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),

    /// Not implemented (501)
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl AppError {
    /// Bearer token missing, malformed, expired or unknown
    pub fn invalid_credentials() -> Self {
        AppError::Unauthorized("Could not validate credentials")
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl IntoResponse for AppError {
    /// Convert error to HTTP response
    ///
    /// Maps each error variant to appropriate HTTP status code
    /// and JSON error body.
    fn into_response(self) -> Response {
        use axum::Json;

        let (status, error_message, error_type) = match &self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), "not_found"),
            AppError::Unauthorized(_) => {
                (StatusCode::UNAUTHORIZED, self.to_string(), "unauthorized")
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string(), "forbidden"),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "validation"),
            AppError::NotImplemented(msg) => {
                (StatusCode::NOT_IMPLEMENTED, msg.clone(), "not_implemented")
            }
            AppError::HttpClient(_) => (
                StatusCode::BAD_GATEWAY,
                "Emotion classifier unavailable".to_string(),
                "http_client",
            ),
            AppError::Classifier(_) => (
                StatusCode::BAD_GATEWAY,
                "Emotion classifier unavailable".to_string(),
                "classifier",
            ),
            AppError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Database error".to_string(),
                "database",
            ),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), "config"),
            AppError::Encryption(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "encryption",
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                "internal",
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, error_type, "Request failed");
        }

        // Record error metric
        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();

        let body = Json(serde_json::json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
