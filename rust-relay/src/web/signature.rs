//! Razorpay webhook signature verification.
//!
//! Razorpay signs the raw request body with HMAC-SHA256 using the webhook
//! secret and sends the hex digest in the `X-Razorpay-Signature` header.
//! Reference: https://razorpay.com/docs/webhooks/validate-test/

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::warn;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Compute the hex-encoded HMAC-SHA256 of `body` keyed with `secret`.
pub fn sign(body: &[u8], secret: &str) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(body);
    Some(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a Razorpay webhook signature against the raw, unparsed body.
///
/// A missing signature is a plain `false`, not an error. The digest lengths
/// are compared first; only equal-length values reach the constant-time
/// comparison.
pub fn verify_razorpay_signature(body: &[u8], signature: Option<&str>, secret: &str) -> bool {
    let signature = match signature.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => {
            warn!(body_length = body.len(), "razorpay_signature_missing");
            return false;
        }
    };

    if secret.is_empty() {
        warn!("razorpay_signature_no_secret");
        return false;
    }

    let expected = match sign(body, secret) {
        Some(digest) => digest,
        None => {
            warn!("razorpay_signature_invalid_key");
            return false;
        }
    };

    let valid = constant_time_compare(&expected, signature);

    if !valid {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            "razorpay_signature_mismatch"
        );
    }

    valid
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
