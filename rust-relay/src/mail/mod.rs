//! Outbound email delivery.

pub mod resend;

pub use resend::{EmailMessage, ResendClient, SendOutcome};
