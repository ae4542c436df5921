//! Price-to-product mapping and confirmation email content.

use html_escape::{encode_double_quoted_attribute, encode_text};

use super::extract::PurchaseDetails;
use crate::config::ProductLinks;

/// Price of the blueprint in paise (₹149).
pub const BLUEPRINT_AMOUNT: i64 = 14_900;

/// Price of the complete kit in paise (₹249).
pub const COMPLETE_KIT_AMOUNT: i64 = 24_900;

/// What a payment amount buys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Product {
    Blueprint,
    CompleteKit,
    Unknown,
}

impl Product {
    /// Exact-match lookup on the amount in minor units.
    pub fn for_amount(amount: i64) -> Self {
        match amount {
            BLUEPRINT_AMOUNT => Product::Blueprint,
            COMPLETE_KIT_AMOUNT => Product::CompleteKit,
            _ => Product::Unknown,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Product::Blueprint => "The Blueprint",
            Product::CompleteKit => "The Complete Kit (Blueprint + Toolkit)",
            Product::Unknown => "Your purchase",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Product::Blueprint => "blueprint",
            Product::CompleteKit => "complete_kit",
            Product::Unknown => "unknown",
        }
    }

    /// Access links as (label, url) pairs.
    fn links<'a>(&self, links: &'a ProductLinks) -> Vec<(&'static str, &'a str)> {
        match self {
            Product::Blueprint => vec![("Access the Blueprint", links.blueprint.as_str())],
            Product::CompleteKit => vec![
                ("Access the Blueprint", links.blueprint.as_str()),
                ("Access the Toolkit", links.toolkit.as_str()),
            ],
            Product::Unknown => Vec::new(),
        }
    }
}

/// Subject and HTML body of a confirmation email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub product: Product,
    pub subject: String,
    pub html: String,
}

/// Render an amount in minor units as major units.
///
/// Whole amounts drop the decimals: `24900` is `249`, `14950` is `149.50`.
pub fn format_amount(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let (major, minor) = (abs / 100, abs % 100);

    if minor == 0 {
        format!("{}{}", sign, major)
    } else {
        format!("{}{}.{:02}", sign, major, minor)
    }
}

/// Build the confirmation email for a purchase.
pub fn render_email(details: &PurchaseDetails, links: &ProductLinks) -> EmailContent {
    let product = Product::for_amount(details.amount);
    let amount = format!("{} {}", details.currency, format_amount(details.amount));

    let subject = match product {
        Product::Unknown => "Payment received - thank you!".to_string(),
        _ => format!("Your access to {} is ready", product.title()),
    };

    let access = match product {
        Product::Unknown => "<p>We have received your payment. We could not match it to a \
             product automatically, so please reply to this email or contact us and we will \
             send your access links right away.</p>"
            .to_string(),
        _ => {
            let items: String = product
                .links(links)
                .into_iter()
                .map(|(label, url)| {
                    format!(
                        "<li><a href=\"{}\">{}</a></li>",
                        encode_double_quoted_attribute(url),
                        label
                    )
                })
                .collect();
            format!(
                "<p>Thank you for purchasing <strong>{}</strong>. \
                 Your access links:</p><ul>{}</ul>",
                encode_text(product.title()),
                items
            )
        }
    };

    let phone = details
        .phone
        .as_deref()
        .map(|phone| format!("<tr><td>Phone</td><td>{}</td></tr>", encode_text(phone)))
        .unwrap_or_default();

    let html = format!(
        "<div style=\"font-family:sans-serif;line-height:1.5\">\
         <h2>Payment confirmed</h2>\
         {access}\
         <table>\
         <tr><td>Amount</td><td>{amount}</td></tr>\
         <tr><td>Reference</td><td>{reference}</td></tr>\
         <tr><td>Payment ID</td><td>{payment_id}</td></tr>\
         {phone}\
         </table>\
         <p>Keep this email for your records.</p>\
         </div>",
        access = access,
        amount = encode_text(&amount),
        reference = encode_text(&details.reference),
        payment_id = encode_text(&details.payment_id),
        phone = phone,
    );

    EmailContent {
        product,
        subject,
        html,
    }
}
