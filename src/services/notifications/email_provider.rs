//! Email notification provider implementation.
//!
//! Sends plain text mail over SMTP using `lettre`'s async transport.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::provider::{NotificationProvider, mismatched_fields};
use crate::config::settings::EmailDeliveryConfig;
use crate::error::{AppError, AppResult};
use crate::models::{BackendKind, DeliveryFields, EmailFields};

/// SMTP email provider
///
/// Talks plain SMTP to the configured relay (a local MTA by default).
/// `to` may hold a comma-separated list of recipients.
#[derive(Clone)]
pub struct EmailProvider {
    smtp_host: String,
    smtp_port: u16,
    default_sender: String,
    timeout: Duration,
}

impl EmailProvider {
    /// Creates a new email provider
    ///
    /// # Arguments
    /// * `config` - SMTP relay and default sender
    /// * `timeout` - Deadline for the whole SMTP exchange
    pub fn new(config: &EmailDeliveryConfig, timeout: Duration) -> Self {
        Self {
            smtp_host: config.smtp_host.clone(),
            smtp_port: config.smtp_port,
            default_sender: config.default_sender.clone(),
            timeout,
        }
    }

    /// Composes the message, falling back to the default sender
    fn build_message(&self, message: &str, fields: &EmailFields) -> AppResult<Message> {
        let sender = fields.sender.as_deref().unwrap_or(&self.default_sender);
        let from: Mailbox = sender
            .parse()
            .map_err(|e| AppError::delivery(self.name(), format!("Invalid sender '{}': {}", sender, e)))?;
        let recipients = fields
            .to
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(|address| {
                address.parse::<Mailbox>().map_err(|e| {
                    AppError::delivery(
                        self.name(),
                        format!("Invalid recipient '{}': {}", address, e),
                    )
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        if recipients.is_empty() {
            return Err(AppError::delivery(self.name(), "No recipient address"));
        }

        let mut builder = Message::builder()
            .from(from)
            .subject(fields.subject.as_str())
            .header(ContentType::TEXT_PLAIN);
        for recipient in recipients {
            builder = builder.to(recipient);
        }

        builder
            .body(message.to_string())
            .map_err(|e| AppError::delivery(self.name(), format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl NotificationProvider for EmailProvider {
    async fn deliver(&self, message: &str, fields: &DeliveryFields) -> AppResult<()> {
        let DeliveryFields::Email(fields) = fields else {
            return Err(mismatched_fields(BackendKind::Email, fields));
        };

        let email = self.build_message(message, fields)?;
        let start = Instant::now();

        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.smtp_host)
            .port(self.smtp_port)
            .timeout(Some(self.timeout))
            .build();

        match tokio::time::timeout(self.timeout, transport.send(email)).await {
            Ok(Ok(response)) => {
                debug!(
                    code = %response.code(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "SMTP relay accepted message"
                );
                Ok(())
            }
            Ok(Err(e)) => Err(AppError::delivery(
                self.name(),
                format!("SMTP {}:{} - {}", self.smtp_host, self.smtp_port, e),
            )),
            Err(_) => Err(AppError::delivery(
                self.name(),
                format!("SMTP timed out after {}s", self.timeout.as_secs()),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
