//! Bot service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! Error messages returned to clients are intentionally generic to avoid
//! leaking internal details. Actual errors are logged server-side.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Bot service error type.
///
/// Maps to appropriate HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - VerificationFailed: 403 Forbidden
/// - NotFound: 404 Not Found
/// - MessagingUnavailable: 503 Service Unavailable
/// - Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Webhook verification failed")]
    VerificationFailed,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Messaging unavailable: {0}")]
    MessagingUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Returns the HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            BotError::BadRequest(_) => 400,
            BotError::VerificationFailed => 403,
            BotError::NotFound(_) => 404,
            BotError::MessagingUnavailable(_) => 503,
            BotError::Internal(_) => 500,
        }
    }
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

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            BotError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            BotError::VerificationFailed => (
                StatusCode::FORBIDDEN,
                "VERIFICATION_FAILED",
                "Webhook verification failed".to_string(),
            ),
            BotError::NotFound(resource) => (StatusCode::NOT_FOUND, "NOT_FOUND", resource.clone()),
            BotError::MessagingUnavailable(reason) => {
                // Log actual reason server-side, return generic message to client
                tracing::warn!(target: "bot.messaging", reason = %reason, "Messaging unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MESSAGING_UNAVAILABLE",
                    "Messaging channel temporarily unavailable".to_string(),
                )
            }
            BotError::Internal(reason) => {
                tracing::error!(target: "bot.internal", reason = %reason, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
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
