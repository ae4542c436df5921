//! Razorpay payment webhook relay.
//!
//! Receives Razorpay payment webhooks, verifies their HMAC-SHA256
//! signature, and sends a purchase confirmation email with the product
//! access links through Resend.
//!
//! ## Flow
//!
//! ```text
//! Razorpay → POST /webhooks/razorpay → verify → decode → extract → render → Resend
//! ```

pub mod config;
pub mod error;
pub mod mail;
pub mod process;
pub mod web;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::RelayError;
pub use mail::{EmailMessage, ResendClient, SendOutcome};
pub use process::{process_event, Outcome, RazorpayEvent};
pub use web::{router, AppState};
