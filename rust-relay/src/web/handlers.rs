//! Webhook endpoint handlers.
//!
//! The Razorpay handler runs strictly in order:
//! 1. Method check (405)
//! 2. Configuration check (500)
//! 3. Raw body capture (500 on read failure)
//! 4. Signature verification over the raw bytes (401)
//! 5. JSON decode (400 only when the body is not JSON at all)
//! 6. Dispatch and acknowledge (always 200 from here on)

use std::sync::Arc;

use axum::{
    body::to_bytes,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::RelayError;
use crate::mail::ResendClient;
use crate::process::{process_event, Outcome, RazorpayEvent};
use crate::web::signature::{verify_razorpay_signature, SIGNATURE_HEADER};
use crate::Config;

/// Largest webhook body accepted.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub mailer: ResendClient,
}

impl AppState {
    pub fn new(config: Config) -> reqwest::Result<Self> {
        let mailer = ResendClient::new(config.resend_api_url.clone(), config.request_timeout())?;
        Ok(Self {
            config: Arc::new(config),
            mailer,
        })
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Razorpay Webhook
// =============================================================================

/// Webhook response.
#[derive(Debug, Default, Serialize)]
pub struct WebhookResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resend_error: Option<String>,
}

impl From<Outcome> for WebhookResponse {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Ignored { event } => WebhookResponse {
                ok: true,
                ignored: Some(event),
                ..Default::default()
            },
            Outcome::NoRecipient => WebhookResponse {
                ok: true,
                note: Some("no buyer email found; email skipped"),
                ..Default::default()
            },
            Outcome::Sent { email_id } => WebhookResponse {
                ok: true,
                email_id,
                ..Default::default()
            },
            Outcome::SendFailed { body, .. } => WebhookResponse {
                ok: false,
                resend_error: Some(body),
                ..Default::default()
            },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(WebhookResponse {
                ok: false,
                error: Some(self.code()),
                ..Default::default()
            }),
        )
            .into_response()
    }
}

/// Razorpay webhook endpoint.
///
/// Routed for every method so that non-POST requests get a JSON 405.
pub async fn razorpay_webhook(State(state): State<AppState>, request: Request) -> Response {
    if request.method() != Method::POST {
        warn!(method = %request.method(), "razorpay_method_not_allowed");
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            [(header::ALLOW, "POST")],
            Json(WebhookResponse {
                ok: false,
                error: Some("method_not_allowed"),
                ..Default::default()
            }),
        )
            .into_response();
    }

    let credentials = match state.config.credentials() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "razorpay_config_missing");
            return e.into_response();
        }
    };

    let signature = request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = match to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            error!(error = %e, "razorpay_body_read_failed");
            return RelayError::BodyRead(e.to_string()).into_response();
        }
    };

    info!(
        body_length = body.len(),
        has_signature = signature.is_some(),
        "razorpay_webhook_received"
    );

    if !verify_razorpay_signature(&body, signature.as_deref(), credentials.webhook_secret) {
        warn!(body_length = body.len(), "razorpay_signature_invalid");
        return RelayError::InvalidSignature.into_response();
    }

    let event = match RazorpayEvent::parse(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "razorpay_payload_malformed");
            return RelayError::from(e).into_response();
        }
    };

    info!(event = %event.event, "razorpay_event_verified");

    let outcome = process_event(&event, &state.config, credentials, &state.mailer).await;

    (StatusCode::OK, Json(WebhookResponse::from(outcome))).into_response()
}
