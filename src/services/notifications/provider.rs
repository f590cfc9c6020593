//! Core notification provider trait.
//!
//! Every delivery backend implements [`NotificationProvider`]. Providers get
//! the trimmed message plus the typed fields merged for their backend.

use async_trait::async_trait;

use crate::error::{AppError, AppResult};
use crate::models::{BackendKind, DeliveryFields};

/// Trait for notification providers (Pushover, email)
///
/// Uses `async_trait` to support async methods with dynamic dispatch.
/// All providers must be Send + Sync for use in async contexts.
///
/// # Example Implementation
/// ```ignore
/// use async_trait::async_trait;
///
/// pub struct ConsoleProvider;
///
/// #[async_trait]
/// impl NotificationProvider for ConsoleProvider {
///     async fn deliver(&self, message: &str, _fields: &DeliveryFields) -> AppResult<()> {
///         println!("{message}");
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "console"
///     }
/// }
/// ```
#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Deliver one notification
    ///
    /// # Arguments
    /// * `message` - Notification body, already trimmed and non-empty
    /// * `fields` - Merged fields for this provider's backend
    ///
    /// # Errors
    /// `AppError::Delivery` for a rejected request or a transport failure
    async fn deliver(&self, message: &str, fields: &DeliveryFields) -> AppResult<()>;

    /// Returns the provider name for logging/debugging
    fn name(&self) -> &'static str;
}

/// Error for a provider handed another backend's fields
pub(crate) fn mismatched_fields(expected: BackendKind, fields: &DeliveryFields) -> AppError {
    AppError::delivery(
        expected.as_str(),
        format!("Received {} fields", fields.kind()),
    )
}
