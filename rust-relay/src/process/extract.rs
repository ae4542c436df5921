//! Field extraction from recognized Razorpay events.
//!
//! Buyer email, phone and reference can sit in several places depending on
//! the event. Each is resolved by trying an ordered list of lookups; the
//! first non-empty value wins.

use tracing::{info, warn};

use super::event::{EventKind, EventPayload, PaymentEntity, PaymentLinkEntity};

/// Currency assumed when the event carries none.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Placeholder for identifiers the event does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single place a value may be found.
type Lookup = fn(&EventPayload) -> Option<String>;

/// Where the recipient address came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Buyer(String),
    Fallback(String),
    Missing,
}

impl Recipient {
    pub fn address(&self) -> Option<&str> {
        match self {
            Recipient::Buyer(a) | Recipient::Fallback(a) => Some(a.as_str()),
            Recipient::Missing => None,
        }
    }
}

/// Transaction details pulled out of a trusted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseDetails {
    /// Amount in minor currency units (paise)
    pub amount: i64,
    pub currency: String,
    pub payment_id: String,
    pub recipient: Recipient,
    pub phone: Option<String>,
    /// Order id, payment-link reference id, or payment-link id
    pub reference: String,
}

fn payment(p: &EventPayload) -> Option<&PaymentEntity> {
    p.payment.as_ref().map(|e| &e.entity)
}

fn payment_link(p: &EventPayload) -> Option<&PaymentLinkEntity> {
    p.payment_link.as_ref().map(|e| &e.entity)
}

fn payment_email(p: &EventPayload) -> Option<String> {
    payment(p)?.email.clone()
}

fn payment_notes_email(p: &EventPayload) -> Option<String> {
    payment(p)?.notes.get("email")
}

fn link_customer_email(p: &EventPayload) -> Option<String> {
    payment_link(p)?.customer.as_ref()?.email.clone()
}

fn payment_contact(p: &EventPayload) -> Option<String> {
    payment(p)?.contact.clone()
}

fn link_customer_contact(p: &EventPayload) -> Option<String> {
    payment_link(p)?.customer.as_ref()?.contact.clone()
}

fn payment_order_id(p: &EventPayload) -> Option<String> {
    payment(p)?.order_id.clone()
}

fn payment_notes_reference(p: &EventPayload) -> Option<String> {
    payment(p)?.notes.get("reference_id")
}

fn link_reference_id(p: &EventPayload) -> Option<String> {
    payment_link(p)?.reference_id.clone()
}

fn link_id(p: &EventPayload) -> Option<String> {
    payment_link(p)?.id.clone()
}

const CAPTURED_EMAIL: &[Lookup] = &[payment_email, payment_notes_email];
const LINK_EMAIL: &[Lookup] = &[link_customer_email, payment_email, payment_notes_email];

const CAPTURED_PHONE: &[Lookup] = &[payment_contact];
const LINK_PHONE: &[Lookup] = &[link_customer_contact, payment_contact];

const CAPTURED_REFERENCE: &[Lookup] = &[payment_order_id, payment_notes_reference];
const LINK_REFERENCE: &[Lookup] = &[link_reference_id, link_id, payment_order_id];

fn email_lookups(kind: EventKind) -> &'static [Lookup] {
    match kind {
        EventKind::PaymentCaptured => CAPTURED_EMAIL,
        EventKind::PaymentLinkPaid => LINK_EMAIL,
    }
}

fn phone_lookups(kind: EventKind) -> &'static [Lookup] {
    match kind {
        EventKind::PaymentCaptured => CAPTURED_PHONE,
        EventKind::PaymentLinkPaid => LINK_PHONE,
    }
}

fn reference_lookups(kind: EventKind) -> &'static [Lookup] {
    match kind {
        EventKind::PaymentCaptured => CAPTURED_REFERENCE,
        EventKind::PaymentLinkPaid => LINK_REFERENCE,
    }
}

/// Try each lookup in order and return the first non-blank value.
fn first_present(payload: &EventPayload, lookups: &[Lookup]) -> Option<String> {
    lookups
        .iter()
        .filter_map(|lookup| lookup(payload))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Resolve amount and currency.
///
/// The payment entity is the source of truth: it is what was actually
/// captured. For payment-link events the link's `amount_paid` (then
/// `amount`) is only used when no payment entity amount exists.
fn amount_and_currency(kind: EventKind, payload: &EventPayload) -> (i64, String) {
    let payment = payment(payload);
    let link = match kind {
        EventKind::PaymentLinkPaid => payment_link(payload),
        EventKind::PaymentCaptured => None,
    };

    let payment_amount = payment.and_then(|p| p.amount);
    let link_amount = link.and_then(|l| l.amount_paid.or(l.amount));

    if let (Some(paid), Some(linked)) = (payment_amount, link_amount) {
        if paid != linked {
            warn!(
                payment_amount = paid,
                link_amount = linked,
                "amount_sources_disagree"
            );
        }
    }

    let payment_currency = payment.and_then(|p| non_blank(p.currency.as_ref()));
    let link_currency = link.and_then(|l| non_blank(l.currency.as_ref()));

    if let (Some(paid), Some(linked)) = (&payment_currency, &link_currency) {
        if !paid.eq_ignore_ascii_case(linked) {
            warn!(
                payment_currency = %paid,
                link_currency = %linked,
                "currency_sources_disagree"
            );
        }
    }

    let amount = payment_amount.or(link_amount).unwrap_or(0);
    let currency = payment_currency
        .or(link_currency)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    (amount, currency)
}

/// Extract purchase details from a recognized event.
pub fn extract_details(
    kind: EventKind,
    payload: &EventPayload,
    fallback_email: Option<&str>,
) -> PurchaseDetails {
    let (amount, currency) = amount_and_currency(kind, payload);

    let payment_id = payment(payload)
        .and_then(|p| non_blank(p.id.as_ref()))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let recipient = match first_present(payload, email_lookups(kind)) {
        Some(email) => Recipient::Buyer(email),
        None => match fallback_email {
            Some(fallback) if !fallback.trim().is_empty() => {
                Recipient::Fallback(fallback.trim().to_string())
            }
            _ => Recipient::Missing,
        },
    };

    let phone = first_present(payload, phone_lookups(kind));

    let reference = first_present(payload, reference_lookups(kind))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let recipient_source = match &recipient {
        Recipient::Buyer(_) => "buyer",
        Recipient::Fallback(_) => "fallback",
        Recipient::Missing => "none",
    };

    info!(
        event = kind.as_str(),
        amount = amount,
        currency = %currency,
        payment_id = %payment_id,
        reference = %reference,
        has_phone = phone.is_some(),
        recipient_source = recipient_source,
        "purchase_details_extracted"
    );

    PurchaseDetails {
        amount,
        currency,
        payment_id,
        recipient,
        phone,
        reference,
    }
}
