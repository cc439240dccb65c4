//! Order notification emails.
//!
//! Two messages go out per captured order: a "new order" notice to the shop
//! admin and an "order confirmed" receipt to the customer. Delivery is SMTP
//! via lettre with askama templates (`templates/email/`); when no SMTP server
//! is configured sends are skipped and logged.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
};

use crate::config::{EmailConfig, SmtpTls};
use crate::error::{AppError, Result};
use crate::models::{CartItem, CustomerDetails};
use crate::payments::minor_to_major;

/// Result of attempting to send a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailSendResult {
    /// Handed to the SMTP server
    Sent,
    /// No SMTP server configured; nothing was sent
    Disabled,
}

/// What both order emails are rendered from.
#[derive(Debug, Clone, Copy)]
pub struct OrderSummary<'a> {
    /// `None` when the order could not be saved
    pub order_id: Option<&'a str>,
    pub payment_id: &'a str,
    /// Minor units, as posted by the checkout
    pub amount: Option<u64>,
    pub items: &'a [CartItem],
    pub customer: &'a CustomerDetails,
}

#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// One cart line as both messages show it.
struct ItemLine {
    name: String,
    /// `" (M)"`, or empty when no size was picked
    size_suffix: String,
    quantity: u32,
    price: String,
}

/// Order details shared by every template.
struct OrderDetails<'a> {
    order_id: &'a str,
    payment_id: &'a str,
    amount: String,
    items: Vec<ItemLine>,
    customer: &'a CustomerDetails,
}

impl<'a> OrderDetails<'a> {
    fn new(summary: &OrderSummary<'a>) -> Self {
        let items = summary
            .items
            .iter()
            .map(|item| ItemLine {
                name: item.name.clone().unwrap_or_else(|| "Unnamed item".to_string()),
                size_suffix: item
                    .size
                    .as_deref()
                    .filter(|s| !s.is_empty())
                    .map(|s| format!(" ({})", s))
                    .unwrap_or_default(),
                quantity: item.quantity(),
                price: format_price(item.price),
            })
            .collect();

        Self {
            order_id: summary.order_id.unwrap_or("Pending"),
            payment_id: summary.payment_id,
            amount: format_amount(summary.amount),
            items,
            customer: summary.customer,
        }
    }
}

#[derive(Template)]
#[template(path = "email/admin_notification.html")]
struct AdminNotificationHtml<'a> {
    details: &'a OrderDetails<'a>,
}

#[derive(Template)]
#[template(path = "email/admin_notification.txt")]
struct AdminNotificationText<'a> {
    details: &'a OrderDetails<'a>,
}

#[derive(Template)]
#[template(path = "email/customer_confirmation.html")]
struct CustomerConfirmationHtml<'a> {
    details: &'a OrderDetails<'a>,
    store_name: &'a str,
}

#[derive(Template)]
#[template(path = "email/customer_confirmation.txt")]
struct CustomerConfirmationText<'a> {
    details: &'a OrderDetails<'a>,
    store_name: &'a str,
}

fn format_amount(amount: Option<u64>) -> String {
    amount
        .map(|a| minor_to_major(a).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn format_price(price: Option<f64>) -> String {
    price.map(|p| p.to_string()).unwrap_or_else(|| "N/A".to_string())
}

fn template_error(e: askama::Error) -> AppError {
    AppError::Internal(format!("Failed to render email: {}", e))
}

/// "New order" notice for the shop admin.
pub fn render_admin_notification(summary: &OrderSummary<'_>) -> Result<RenderedEmail> {
    let details = OrderDetails::new(summary);
    Ok(RenderedEmail {
        subject: format!("New Order from {}", summary.customer.name),
        text: AdminNotificationText { details: &details }
            .render()
            .map_err(template_error)?,
        html: AdminNotificationHtml { details: &details }
            .render()
            .map_err(template_error)?,
    })
}

/// "Order confirmed" receipt for the customer.
pub fn render_customer_confirmation(
    summary: &OrderSummary<'_>,
    store_name: &str,
) -> Result<RenderedEmail> {
    let details = OrderDetails::new(summary);
    Ok(RenderedEmail {
        subject: format!("Order Confirmation - {}", store_name),
        text: CustomerConfirmationText {
            details: &details,
            store_name,
        }
        .render()
        .map_err(template_error)?,
        html: CustomerConfirmationHtml {
            details: &details,
            store_name,
        }
        .render()
        .map_err(template_error)?,
    })
}

/// SMTP-backed email service.
#[derive(Clone)]
pub struct EmailService {
    /// `None` when email delivery is not configured
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Option<String>,
    admin_address: Option<String>,
    store_name: String,
}

impl EmailService {
    /// Build the service from optional SMTP settings.
    ///
    /// The admin address falls back to the from address.
    pub fn new(
        config: Option<&EmailConfig>,
        admin_address: Option<String>,
        store_name: String,
    ) -> Result<Self> {
        let Some(config) = config else {
            return Ok(Self::disabled(store_name));
        };

        let builder = match config.tls {
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .map_err(|e| AppError::Internal(format!("Invalid SMTP host: {}", e)))?,
            SmtpTls::Opportunistic => {
                let params = TlsParameters::new(config.host.clone())
                    .map_err(|e| AppError::Internal(format!("Invalid SMTP TLS settings: {}", e)))?;
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                    .tls(Tls::Opportunistic(params))
            }
            SmtpTls::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let builder = builder.port(config.port);
        let builder = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => builder.credentials(Credentials::new(user.clone(), pass.clone())),
            _ => builder,
        };

        Ok(Self {
            mailer: Some(builder.build()),
            admin_address: admin_address.or_else(|| Some(config.from_address.clone())),
            from_address: Some(config.from_address.clone()),
            store_name,
        })
    }

    /// A service that logs and skips every send.
    pub fn disabled(store_name: String) -> Self {
        Self {
            mailer: None,
            from_address: None,
            admin_address: None,
            store_name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    /// Send the "new order" notice to the admin address.
    pub async fn send_admin_notification(&self, summary: &OrderSummary<'_>) -> Result<EmailSendResult> {
        let Some(to) = self.admin_address.as_deref() else {
            tracing::debug!(payment_id = %summary.payment_id, "Email disabled, skipping admin notification");
            return Ok(EmailSendResult::Disabled);
        };
        self.send(to, render_admin_notification(summary)?).await
    }

    /// Send the "order confirmed" receipt to the customer.
    pub async fn send_customer_confirmation(
        &self,
        summary: &OrderSummary<'_>,
    ) -> Result<EmailSendResult> {
        self.send(
            &summary.customer.email,
            render_customer_confirmation(summary, &self.store_name)?,
        )
        .await
    }

    async fn send(&self, to: &str, email: RenderedEmail) -> Result<EmailSendResult> {
        let (Some(mailer), Some(from)) = (&self.mailer, &self.from_address) else {
            tracing::debug!(subject = %email.subject, "Email disabled, skipping send");
            return Ok(EmailSendResult::Disabled);
        };

        let from: Mailbox = from
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid from address '{}': {}", from, e)))?;
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address '{}': {}", to, e)))?;

        let message = Message::builder()
            .from(from)
            .to(to_mailbox)
            .subject(email.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(email.text, email.html))
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        mailer.send(message).await.map_err(|e| {
            tracing::error!(error = %e, to = %to, "SMTP send failed");
            AppError::Internal(format!("Email service error: {}", e))
        })?;

        tracing::info!(to = %to, subject = %email.subject, "Email sent");
        Ok(EmailSendResult::Sent)
    }
}
