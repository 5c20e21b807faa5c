//! Error handler for the contact relay.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("origin not allowed")]
    OriginDenied,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("mail delivery failed: {0}")]
    Delivery(String),

    #[error("mail transport unavailable: {0}")]
    Unhealthy(String),

    #[error("internal server error, {details}")]
    Internal { details: String },
}

/// Body of every non-2xx response: `{ "ok": false, "error": "..." }`.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    ok: bool,
    error: String,
}

impl ResponseError {
    fn new(error: &str) -> Self {
        Self {
            ok: false,
            error: error.to_owned(),
        }
    }
}

/// Pick the first human-readable message out of a [`ValidationErrors`].
fn first_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(_, issues)| issues.iter())
        .find_map(|issue| issue.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid request.".to_owned())
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, first_message(errors))
            },

            ServerError::Axum(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            },

            ServerError::OriginDenied => {
                (StatusCode::FORBIDDEN, "Origin not allowed.".to_owned())
            },

            ServerError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "Rate limit exceeded.".to_owned(),
            ),

            // Transport details stay server-side.
            ServerError::Delivery(details) => {
                tracing::error!(%details, "mail delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Mail send failed.".to_owned(),
                )
            },

            ServerError::Unhealthy(details) => {
                tracing::error!(%details, "mail transport verification failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Mail transport unavailable.".to_owned(),
                )
            },

            ServerError::Internal { details } => {
                tracing::error!(%details, "server returned 500 status");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error.".to_owned(),
                )
            },
        };

        (status, Json(ResponseError::new(&message))).into_response()
    }
}
