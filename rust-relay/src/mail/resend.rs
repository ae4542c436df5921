//! Resend email API client.
//!
//! Reference: https://resend.com/docs/api-reference/emails/send-email

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

/// One outbound email.
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

/// Result of a send attempt.
///
/// Transport failures are reported here too (`status == 0`), so callers
/// never need to handle an error path separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub ok: bool,
    pub status: u16,
    pub body: String,
}

impl SendOutcome {
    /// The `id` field of a successful Resend response, if present.
    pub fn email_id(&self) -> Option<String> {
        if !self.ok {
            return None;
        }
        serde_json::from_str::<serde_json::Value>(&self.body)
            .ok()?
            .get("id")?
            .as_str()
            .map(str::to_string)
    }
}

/// Thin client over the Resend send endpoint.
#[derive(Clone)]
pub struct ResendClient {
    client: Client,
    api_url: String,
}

impl ResendClient {
    /// Fails only if the TLS backend cannot be initialised.
    pub fn new(api_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Send `message` authenticated with `api_key`.
    pub async fn send(&self, api_key: &str, message: &EmailMessage) -> SendOutcome {
        info!(
            to = ?message.to,
            subject = %message.subject,
            html_length = message.html.len(),
            "resend_send_starting"
        );

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(message)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();
                let body = match resp.text().await {
                    Ok(text) => text,
                    Err(e) => format!("failed to read response body: {}", e),
                };
                let ok = status.is_success();

                if ok {
                    info!(status_code = status.as_u16(), "resend_send_complete");
                } else {
                    error!(
                        status_code = status.as_u16(),
                        response = %body,
                        "resend_send_rejected"
                    );
                }

                SendOutcome {
                    ok,
                    status: status.as_u16(),
                    body,
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    error!(error = %e, "resend_send_timeout");
                } else {
                    error!(error = %e, "resend_send_error");
                }

                SendOutcome {
                    ok: false,
                    status: 0,
                    body: e.to_string(),
                }
            }
        }
    }
}
