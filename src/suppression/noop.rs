//! NoOp suppression store.
//!
//! Used when suppression is disabled. Nothing is ever suppressed.

use async_trait::async_trait;

use crate::suppression::{SuppressionBackend, SuppressionError};

/// A store that remembers nothing.
///
/// Used when `suppression.backend = "none"` in configuration.
pub struct NoOpBackend;

impl NoOpBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SuppressionBackend for NoOpBackend {
    async fn exists(&self, _key: &str) -> Result<bool, SuppressionError> {
        Ok(false)
    }

    async fn set_with_expiry(&self, _key: &str, _ttl_seconds: u64) -> Result<(), SuppressionError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
