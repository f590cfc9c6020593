//! Pushover notification provider implementation.
//!
//! Sends push notifications through the Pushover message API.
//! Uses the global `HTTP_CLIENT` for the request.
//!
//! Pushover API Reference: https://pushover.net/api

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use super::provider::{NotificationProvider, mismatched_fields};
use crate::config::settings::PushoverDeliveryConfig;
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;
use crate::models::{BackendKind, DeliveryFields, PushoverFields};

/// Pushover notification provider
///
/// Posts one form-encoded request per notification. The application token
/// and user key come from the merged delivery fields.
///
/// # Example
/// ```ignore
/// let provider = PushoverProvider::new(&settings.delivery.pushover, Duration::from_secs(5));
/// provider.deliver("Backup finished", &fields).await?;
/// ```
#[derive(Clone)]
pub struct PushoverProvider {
    api_url: String,
    timeout: Duration,
}

impl PushoverProvider {
    /// Creates a new Pushover provider
    ///
    /// # Arguments
    /// * `config` - API endpoint settings
    /// * `timeout` - Deadline for the whole request
    pub fn new(config: &PushoverDeliveryConfig, timeout: Duration) -> Self {
        Self {
            api_url: config.api_url.clone(),
            timeout,
        }
    }

    /// Builds the form body for the messages API
    fn build_form<'a>(message: &'a str, fields: &'a PushoverFields) -> Vec<(&'static str, &'a str)> {
        let mut form = vec![
            ("token", fields.app_token.as_str()),
            ("user", fields.api_key.as_str()),
            ("message", message),
        ];

        if let Some(title) = &fields.title {
            form.push(("title", title.as_str()));
        }

        form
    }
}

#[async_trait]
impl NotificationProvider for PushoverProvider {
    /// Sends a notification via Pushover
    ///
    /// Any non-2xx response is a failure; the response body is kept in the
    /// error because Pushover explains rejections there.
    async fn deliver(&self, message: &str, fields: &DeliveryFields) -> AppResult<()> {
        let DeliveryFields::Pushover(fields) = fields else {
            return Err(mismatched_fields(BackendKind::Pushover, fields));
        };

        let start = Instant::now();

        let response = HTTP_CLIENT
            .post(&self.api_url)
            .timeout(self.timeout)
            .form(&Self::build_form(message, fields))
            .send()
            .await
            .map_err(|e| AppError::delivery(self.name(), format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            return Err(AppError::delivery(
                self.name(),
                format!("HTTP {}: {}", status.as_u16(), body.trim()),
            ));
        }

        debug!(status = status.as_u16(), duration_ms, "Pushover accepted notification");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "pushover"
    }
}
