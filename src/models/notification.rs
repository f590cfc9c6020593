//! Notification request and outcome models.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::models::BackendKind;

// ============================================================================
// Request
// ============================================================================

/// One notification to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    message: String,
    interval: Option<Duration>,
    backend: Option<String>,
    overrides: BTreeMap<String, String>,
}

impl NotificationRequest {
    /// Create a request for `message`. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    /// `AppError::Validation` when the message is empty after trimming.
    pub fn new(message: impl AsRef<str>) -> AppResult<Self> {
        let message = message.as_ref().trim();
        if message.is_empty() {
            return Err(AppError::validation("message", "Message can not be empty"));
        }

        Ok(Self {
            message: message.to_string(),
            interval: None,
            backend: None,
            overrides: BTreeMap::new(),
        })
    }

    /// Suppress repeats of this notification for `interval`
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Send only through the named backend
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Override one configured field for this send
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Override several configured fields for this send
    pub fn with_fields<I, K, V>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(fields.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// The interval when it asks for suppression (set and non-zero)
    pub fn suppression_interval(&self) -> Option<Duration> {
        self.interval.filter(|i| !i.is_zero())
    }

    pub fn backend(&self) -> Option<&str> {
        self.backend.as_deref()
    }

    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// What happened to one backend during a send
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Skipped,
    Failed { error: String },
}

/// Per-backend result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendOutcome {
    pub backend: BackendKind,
    #[serde(flatten)]
    pub status: DeliveryStatus,
}

impl BackendOutcome {
    pub fn sent(backend: BackendKind) -> Self {
        Self {
            backend,
            status: DeliveryStatus::Sent,
        }
    }

    pub fn skipped(backend: BackendKind) -> Self {
        Self {
            backend,
            status: DeliveryStatus::Skipped,
        }
    }

    pub fn failed(backend: BackendKind, error: impl Into<String>) -> Self {
        Self {
            backend,
            status: DeliveryStatus::Failed {
                error: error.into(),
            },
        }
    }
}

/// Overall classification of a send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// At least one backend sent, none failed
    Delivered,
    /// At least one backend sent and at least one failed
    PartialFailure,
    /// Every attempted backend was skipped
    Suppressed,
    /// Nothing sent, at least one backend failed
    Failed,
}

impl OutcomeStatus {
    /// Whether the send as a whole counts as successful
    pub fn is_success(&self) -> bool {
        matches!(self, OutcomeStatus::Delivered | OutcomeStatus::Suppressed)
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeStatus::Delivered => "delivered",
            OutcomeStatus::PartialFailure => "partial failure",
            OutcomeStatus::Suppressed => "suppressed",
            OutcomeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Ordered per-backend results of one send
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Outcome {
    results: Vec<BackendOutcome>,
}

impl Outcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: BackendOutcome) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[BackendOutcome] {
        &self.results
    }

    /// Result for one backend, if it was attempted
    pub fn get(&self, backend: BackendKind) -> Option<&DeliveryStatus> {
        self.results
            .iter()
            .find(|r| r.backend == backend)
            .map(|r| &r.status)
    }

    pub fn sent_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Sent))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Skipped))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|s| matches!(s, DeliveryStatus::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&DeliveryStatus) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.status)).count()
    }

    /// Derive the overall status. An empty outcome counts as suppressed.
    pub fn status(&self) -> OutcomeStatus {
        match (self.sent_count(), self.failed_count()) {
            (0, 0) => OutcomeStatus::Suppressed,
            (_, 0) => OutcomeStatus::Delivered,
            (0, _) => OutcomeStatus::Failed,
            _ => OutcomeStatus::PartialFailure,
        }
    }
}
