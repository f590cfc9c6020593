//! Notification system with pluggable providers.
//!
//! The core trait `NotificationProvider` is implemented once per delivery
//! backend. `ProviderRegistry` maps backends to providers and `Dispatcher`
//! drives a send across them with suppression applied.

mod dispatcher;
mod email_provider;
mod provider;
mod pushover_provider;
mod registry;


pub use dispatcher::{Dispatcher, PlannedDelivery};
pub use email_provider::EmailProvider;
pub use provider::NotificationProvider;
pub use pushover_provider::PushoverProvider;
pub use registry::ProviderRegistry;
