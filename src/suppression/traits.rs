//! SuppressionBackend trait definition.

use async_trait::async_trait;

use crate::suppression::SuppressionError;

/// Key-value operations a suppression store must provide.
///
/// A key that exists and has not expired means "suppressed".
#[async_trait]
pub trait SuppressionBackend: Send + Sync {
    /// Whether the key is present and not expired.
    async fn exists(&self, key: &str) -> Result<bool, SuppressionError>;

    /// Create or overwrite the key so that it expires after `ttl_seconds`.
    async fn set_with_expiry(&self, key: &str, ttl_seconds: u64) -> Result<(), SuppressionError>;

    /// Short backend name for log output.
    fn name(&self) -> &'static str;
}
