//! Configuration module for environment variable parsing.
//!
//! All values are read once at startup. Required credentials are kept as
//! `Option` so that a missing value surfaces per request as a 500 instead of
//! preventing the process from starting.

use std::env;
use std::time::Duration;

use tracing::warn;

use crate::error::RelayError;

/// Default email provider endpoint.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Default access link for the blueprint product.
pub const DEFAULT_BLUEPRINT_LINK: &str = "https://drive.google.com/drive/folders/blueprint-access";

/// Default access link for the toolkit bundled in the complete kit.
pub const DEFAULT_TOOLKIT_LINK: &str = "https://drive.google.com/drive/folders/toolkit-access";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Razorpay webhook secret used for HMAC-SHA256 verification
    pub razorpay_webhook_secret: Option<String>,

    /// Resend API key (bearer token)
    pub resend_api_key: Option<String>,

    /// Sender identity, e.g. `Shop <orders@example.com>`
    pub resend_from: Option<String>,

    /// Resend send endpoint
    pub resend_api_url: String,

    /// Recipient used when the event carries no buyer email
    pub fallback_email: Option<String>,

    /// Outbound email request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Product access links
    pub links: ProductLinks,
}

/// The two static product access links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductLinks {
    pub blueprint: String,
    pub toolkit: String,
}

impl Default for ProductLinks {
    fn default() -> Self {
        Self {
            blueprint: DEFAULT_BLUEPRINT_LINK.to_string(),
            toolkit: DEFAULT_TOOLKIT_LINK.to_string(),
        }
    }
}

/// The required credentials, present and non-blank.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    pub webhook_secret: &'a str,
    pub resend_api_key: &'a str,
    pub resend_from: &'a str,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Config {
            port: parse_or(&lookup, "PORT", 8080),

            razorpay_webhook_secret: non_blank("RAZORPAY_WEBHOOK_SECRET"),

            resend_api_key: non_blank("RESEND_API_KEY"),

            resend_from: non_blank("RESEND_FROM"),

            resend_api_url: non_blank("RESEND_API_URL")
                .unwrap_or_else(|| DEFAULT_RESEND_API_URL.to_string()),

            fallback_email: non_blank("FALLBACK_EMAIL").map(|v| v.trim().to_string()),

            request_timeout_ms: parse_or(&lookup, "REQUEST_TIMEOUT_MS", 10_000),

            links: ProductLinks {
                blueprint: non_blank("BLUEPRINT_LINK")
                    .unwrap_or_else(|| DEFAULT_BLUEPRINT_LINK.to_string()),
                toolkit: non_blank("TOOLKIT_LINK")
                    .unwrap_or_else(|| DEFAULT_TOOLKIT_LINK.to_string()),
            },
        }
    }

    /// Return the required credentials, or the names of the missing keys.
    pub fn credentials(&self) -> Result<Credentials<'_>, RelayError> {
        match (
            self.razorpay_webhook_secret.as_deref(),
            self.resend_api_key.as_deref(),
            self.resend_from.as_deref(),
        ) {
            (Some(webhook_secret), Some(resend_api_key), Some(resend_from)) => Ok(Credentials {
                webhook_secret,
                resend_api_key,
                resend_from,
            }),
            _ => Err(RelayError::MissingConfig(self.missing_keys())),
        }
    }

    /// Names of required keys with no usable value.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        [
            ("RAZORPAY_WEBHOOK_SECRET", &self.razorpay_webhook_secret),
            ("RESEND_API_KEY", &self.resend_api_key),
            ("RESEND_FROM", &self.resend_from),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Parse a numeric variable, warning and falling back on bad input.
fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = match lookup(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "invalid_number_using_default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.resend_api_url, DEFAULT_RESEND_API_URL);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.links, ProductLinks::default());
        assert!(config.fallback_email.is_none());
    }

    #[test]
    fn test_credentials_present() {
        let config = config_from(&[
            ("RAZORPAY_WEBHOOK_SECRET", "whsec"),
            ("RESEND_API_KEY", "re_123"),
            ("RESEND_FROM", "Shop <orders@example.com>"),
        ]);

        let creds = config.credentials().unwrap();
        assert_eq!(creds.webhook_secret, "whsec");
        assert_eq!(creds.resend_api_key, "re_123");
        assert_eq!(creds.resend_from, "Shop <orders@example.com>");
    }

    #[test]
    fn test_credentials_missing_reports_names() {
        let config = config_from(&[("RESEND_API_KEY", "re_123"), ("RESEND_FROM", "   ")]);

        match config.credentials() {
            Err(RelayError::MissingConfig(keys)) => {
                assert_eq!(keys, vec!["RAZORPAY_WEBHOOK_SECRET", "RESEND_FROM"]);
            }
            other => panic!("expected MissingConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_port_uses_default() {
        let config = config_from(&[("PORT", "not-a-port"), ("REQUEST_TIMEOUT_MS", "2500")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.request_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn test_link_overrides() {
        let config = config_from(&[
            ("BLUEPRINT_LINK", "https://example.com/bp"),
            ("TOOLKIT_LINK", "https://example.com/tk"),
            ("FALLBACK_EMAIL", " debug@example.com "),
        ]);
        assert_eq!(config.links.blueprint, "https://example.com/bp");
        assert_eq!(config.links.toolkit, "https://example.com/tk");
        assert_eq!(config.fallback_email.as_deref(), Some("debug@example.com"));
    }
}
