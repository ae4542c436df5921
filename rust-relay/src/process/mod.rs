//! Event processing module.
//!
//! Turns a verified Razorpay event into a confirmation email.
//!
//! ## Processing Flow
//!
//! ```text
//! RazorpayEvent → kind() → extract_details() → render_email() → ResendClient::send()
//! ```

pub mod event;
pub mod extract;
pub mod product;

use tracing::{error, info, warn};

use crate::config::{Config, Credentials};
use crate::mail::{EmailMessage, ResendClient};

pub use event::{EventKind, RazorpayEvent, PAYMENT_CAPTURED, PAYMENT_LINK_PAID};
pub use extract::{extract_details, PurchaseDetails, Recipient};
pub use product::{format_amount, render_email, EmailContent, Product};

/// What happened to a verified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Event tag the relay does not act on
    Ignored { event: String },
    /// No buyer email and no fallback configured
    NoRecipient,
    /// Email accepted by the provider
    Sent { email_id: Option<String> },
    /// Email provider rejected the send or could not be reached
    SendFailed { status: u16, body: String },
}

/// Process a verified event.
///
/// Never fails: every business gap degrades to an [`Outcome`] so the
/// webhook is always acknowledged.
pub async fn process_event(
    event: &RazorpayEvent,
    config: &Config,
    credentials: Credentials<'_>,
    mailer: &ResendClient,
) -> Outcome {
    let kind = match event.kind() {
        Some(kind) => kind,
        None => {
            info!(event = %event.event, "event_ignored");
            return Outcome::Ignored {
                event: event.event.clone(),
            };
        }
    };

    let details = extract_details(kind, &event.payload, config.fallback_email.as_deref());

    let to = match details.recipient.address() {
        Some(address) => address.to_string(),
        None => {
            warn!(
                event = kind.as_str(),
                payment_id = %details.payment_id,
                reference = %details.reference,
                "buyer_email_missing"
            );
            return Outcome::NoRecipient;
        }
    };

    let content = render_email(&details, &config.links);

    if content.product == Product::Unknown {
        warn!(
            amount = details.amount,
            currency = %details.currency,
            payment_id = %details.payment_id,
            "product_unmatched"
        );
    }

    let message = EmailMessage {
        from: credentials.resend_from.to_string(),
        to: vec![to],
        subject: content.subject,
        html: content.html,
    };

    let outcome = mailer.send(credentials.resend_api_key, &message).await;

    if outcome.ok {
        info!(
            event = kind.as_str(),
            product = content.product.as_str(),
            payment_id = %details.payment_id,
            "confirmation_email_sent"
        );
        Outcome::Sent {
            email_id: outcome.email_id(),
        }
    } else {
        // Not retried; the webhook is still acknowledged.
        error!(
            event = kind.as_str(),
            payment_id = %details.payment_id,
            reference = %details.reference,
            status_code = outcome.status,
            response = %outcome.body,
            "confirmation_email_failed"
        );
        Outcome::SendFailed {
            status: outcome.status,
            body: outcome.body,
        }
    }
}
