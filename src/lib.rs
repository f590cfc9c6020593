//! sendnotify library
//!
//! Send a short notification through Pushover or email, optionally
//! suppressing repeats of the same notification for an interval.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod services;
pub mod suppression;

pub use error::{AppError, AppResult};
pub use models::{NotificationRequest, Outcome, OutcomeStatus, ResolvedConfig};
pub use services::notifications::{Dispatcher, ProviderRegistry};
pub use suppression::SuppressionStore;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}
