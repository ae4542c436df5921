//! Web server module for handling the Razorpay webhook.
//!
//! The webhook handler verifies the signature over the raw body, sends the
//! confirmation email inline, and acknowledges every verified, decodable
//! event with 200 so Razorpay does not redeliver it.

pub mod handlers;
pub mod signature;

use axum::{
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{health, razorpay_webhook, AppState, HealthResponse, WebhookResponse};
pub use signature::{verify_razorpay_signature, SIGNATURE_HEADER};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhooks/razorpay", any(razorpay_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
