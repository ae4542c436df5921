//! Error types for the webhook relay.

use axum::http::StatusCode;
use thiserror::Error;

/// Failures that stop a webhook request before it is acknowledged.
///
/// Business gaps (unknown event, missing buyer email, unmapped price) and
/// email-provider rejections are not errors; they are acknowledged with 200.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("webhook signature missing or invalid")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

impl RelayError {
    /// HTTP status reported to the caller for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingConfig(_) | RelayError::BodyRead(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            RelayError::InvalidSignature => StatusCode::UNAUTHORIZED,
            RelayError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Short machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::MissingConfig(_) => "server_misconfigured",
            RelayError::BodyRead(_) => "body_read_failed",
            RelayError::InvalidSignature => "invalid_signature",
            RelayError::MalformedPayload(_) => "invalid_json",
        }
    }
}
