//! Razorpay webhook event types.
//!
//! Only the fields the relay consumes are modelled; everything else in the
//! payload is ignored. Decoding never fails once the body is valid JSON: a
//! field with an unexpected shape is treated as absent, so a verified event
//! is always acknowledged instead of being redelivered forever.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Event tag for a captured direct payment.
pub const PAYMENT_CAPTURED: &str = "payment.captured";

/// Event tag for a paid payment link.
pub const PAYMENT_LINK_PAID: &str = "payment_link.paid";

/// Top-level webhook body.
#[derive(Debug, Clone, Default)]
pub struct RazorpayEvent {
    pub event: String,
    pub payload: EventPayload,
}

/// Events the relay acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PaymentCaptured,
    PaymentLinkPaid,
}

impl RazorpayEvent {
    /// Decode a raw body. Fails only when the bytes are not JSON.
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(&value))
    }

    /// Build an event from any JSON value.
    ///
    /// The payload is only decoded for recognized tags.
    pub fn from_value(value: &Value) -> Self {
        let event = value
            .get("event")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let mut decoded = RazorpayEvent {
            event,
            payload: EventPayload::default(),
        };

        if decoded.kind().is_none() {
            return decoded;
        }

        if let Some(payload) = value.get("payload") {
            match EventPayload::deserialize(payload) {
                Ok(payload) => decoded.payload = payload,
                Err(e) => {
                    warn!(event = %decoded.event, error = %e, "event_payload_unreadable");
                }
            }
        }

        decoded
    }

    /// The recognized kind, or `None` for tags that are only acknowledged.
    pub fn kind(&self) -> Option<EventKind> {
        match self.event.as_str() {
            PAYMENT_CAPTURED => Some(EventKind::PaymentCaptured),
            PAYMENT_LINK_PAID => Some(EventKind::PaymentLinkPaid),
            _ => None,
        }
    }
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PaymentCaptured => PAYMENT_CAPTURED,
            EventKind::PaymentLinkPaid => PAYMENT_LINK_PAID,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub payment: Option<Entity<PaymentEntity>>,
    #[serde(default, deserialize_with = "lenient")]
    pub payment_link: Option<Entity<PaymentLinkEntity>>,
}

/// Razorpay wraps each object as `{"entity": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Entity<T> {
    pub entity: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentEntity {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub notes: Notes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentLinkEntity {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<i64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount_paid: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub reference_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub customer: Option<Customer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub contact: Option<String>,
}

/// Free-form merchant notes.
///
/// Razorpay sends `[]` instead of `{}` when no notes were set, and values
/// may be strings or numbers.
#[derive(Debug, Clone, Default)]
pub struct Notes(HashMap<String, Value>);

impl Notes {
    /// String value for `key`; numbers are rendered as text.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Notes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Object(map) => Ok(Notes(map.into_iter().collect())),
            _ => Ok(Notes::default()),
        }
    }
}

/// `Some` when the value has the expected shape, `None` otherwise.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Minor-unit amount from an integer, a whole float, or a numeric string.
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let amount = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> RazorpayEvent {
        RazorpayEvent::parse(json.as_bytes()).unwrap()
    }

    #[test]
    fn test_deserialize_payment_captured() {
        let event = parse(
            r#"{
            "entity": "event",
            "event": "payment.captured",
            "payload": {
                "payment": {
                    "entity": {
                        "id": "pay_29QQoUBi66xm2f",
                        "amount": 14900,
                        "currency": "INR",
                        "status": "captured",
                        "email": "buyer@example.com",
                        "contact": "+919876543210",
                        "order_id": "order_9A33XWu170gUtm",
                        "notes": []
                    }
                }
            }
        }"#,
        );
        assert_eq!(event.kind(), Some(EventKind::PaymentCaptured));

        let payment = event.payload.payment.unwrap().entity;
        assert_eq!(payment.id.as_deref(), Some("pay_29QQoUBi66xm2f"));
        assert_eq!(payment.amount, Some(14900));
        assert_eq!(payment.order_id.as_deref(), Some("order_9A33XWu170gUtm"));
        assert!(payment.notes.get("email").is_none());
    }

    #[test]
    fn test_deserialize_payment_link_paid() {
        let event = parse(
            r#"{
            "event": "payment_link.paid",
            "payload": {
                "payment_link": {
                    "entity": {
                        "id": "plink_ExjpAUN3gVHrPJ",
                        "amount": 24900,
                        "amount_paid": 24900,
                        "currency": "INR",
                        "reference_id": "TS1989",
                        "customer": {
                            "name": "Gaurav Kumar",
                            "email": "gaurav.kumar@example.com",
                            "contact": "+919000090000"
                        }
                    }
                },
                "payment": {
                    "entity": {
                        "id": "pay_ExjpNvRMv4SUP5",
                        "amount": 24900,
                        "notes": {"email": "notes@example.com", "batch": 7}
                    }
                }
            }
        }"#,
        );
        assert_eq!(event.kind(), Some(EventKind::PaymentLinkPaid));

        let link = event.payload.payment_link.unwrap().entity;
        assert_eq!(link.reference_id.as_deref(), Some("TS1989"));
        assert_eq!(
            link.customer.unwrap().email.as_deref(),
            Some("gaurav.kumar@example.com")
        );

        let payment = event.payload.payment.unwrap().entity;
        assert_eq!(payment.notes.get("email").as_deref(), Some("notes@example.com"));
        assert_eq!(payment.notes.get("batch").as_deref(), Some("7"));
    }

    #[test]
    fn test_unrecognized_and_missing_tags() {
        let event = parse(r#"{"event": "refund.created", "payload": {}}"#);
        assert_eq!(event.kind(), None);

        let event = parse("{}");
        assert_eq!(event.event, "");
        assert_eq!(event.kind(), None);

        let event = parse(r#"{"event": 42}"#);
        assert_eq!(event.event, "");
    }

    #[test]
    fn test_non_object_json_is_an_empty_event() {
        for body in ["[1, 2]", "\"payment.captured\"", "null", "17"] {
            let event = parse(body);
            assert_eq!(event.event, "", "body {}", body);
            assert_eq!(event.kind(), None);
        }
    }

    #[test]
    fn test_only_invalid_json_fails() {
        assert!(RazorpayEvent::parse(b"{\"event\": ").is_err());
        assert!(RazorpayEvent::parse(b"").is_err());
    }

    #[test]
    fn test_null_fields_are_absent() {
        let event = parse(
            r#"{
            "event": "payment.captured",
            "payload": {"payment": {"entity": {"email": null, "order_id": null, "notes": null}}}
        }"#,
        );

        let payment = event.payload.payment.unwrap().entity;
        assert!(payment.email.is_none());
        assert!(payment.order_id.is_none());
    }

    #[test]
    fn test_unexpected_shapes_are_absent() {
        let event = parse(r#"{"event": "payment.captured", "payload": null}"#);
        assert!(event.payload.payment.is_none());

        // No `entity` wrapper.
        let event = parse(r#"{"event": "payment.captured", "payload": {"payment": {"id": "x"}}}"#);
        assert!(event.payload.payment.is_none());

        let event = parse(
            r#"{"event": "payment.captured", "payload": {"payment": {"entity": {
                "amount": {"value": 1}, "email": 12, "currency": ["INR"],
                "id": "pay_1"}}}}"#,
        );
        let payment = event.payload.payment.unwrap().entity;
        assert_eq!(payment.amount, None);
        assert_eq!(payment.email, None);
        assert_eq!(payment.currency, None);
        assert_eq!(payment.id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn test_amount_accepts_numeric_strings_and_whole_floats() {
        let event = parse(
            r#"{"event": "payment_link.paid", "payload": {
                "payment_link": {"entity": {"amount": "24900", "amount_paid": 24900.0}},
                "payment": {"entity": {"amount": 249.5}}}}"#,
        );

        let link = event.payload.payment_link.unwrap().entity;
        assert_eq!(link.amount, Some(24900));
        assert_eq!(link.amount_paid, Some(24900));
        assert_eq!(event.payload.payment.unwrap().entity.amount, None);
    }

    #[test]
    fn test_unrecognized_payload_is_not_decoded() {
        let event = parse(
            r#"{"event": "refund.processed", "payload": {"payment": {"entity": {"id": "pay_1"}}}}"#,
        );
        assert!(event.payload.payment.is_none());
    }
}
