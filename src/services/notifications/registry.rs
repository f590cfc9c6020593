//! Provider lookup by backend kind.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::email_provider::EmailProvider;
use super::provider::NotificationProvider;
use super::pushover_provider::PushoverProvider;
use crate::config::DeliveryConfig;
use crate::error::{AppError, AppResult};
use crate::models::BackendKind;

/// Maps each backend to the provider that delivers through it
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<BackendKind, Arc<dyn NotificationProvider>>,
}

impl ProviderRegistry {
    /// Registry with no providers
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in Pushover and email providers
    pub fn from_config(config: &DeliveryConfig) -> Self {
        let timeout = Duration::from_secs(config.timeout_seconds);

        Self::new()
            .with_provider(
                BackendKind::Pushover,
                Arc::new(PushoverProvider::new(&config.pushover, timeout)),
            )
            .with_provider(
                BackendKind::Email,
                Arc::new(EmailProvider::new(&config.email, timeout)),
            )
    }

    /// Register or replace the provider for `kind`
    pub fn with_provider(
        mut self,
        kind: BackendKind,
        provider: Arc<dyn NotificationProvider>,
    ) -> Self {
        self.providers.insert(kind, provider);
        self
    }

    /// Get the provider for a backend
    ///
    /// # Errors
    /// `AppError::Configuration` when nothing is registered for `kind`
    pub fn get(&self, kind: BackendKind) -> AppResult<Arc<dyn NotificationProvider>> {
        self.providers.get(&kind).cloned().ok_or_else(|| {
            AppError::configuration(
                "services.title",
                format!("No provider registered for {}", kind),
            )
        })
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.providers.values().map(|p| p.name()).collect();
        names.sort_unstable();
        f.debug_struct("ProviderRegistry")
            .field("providers", &names)
            .finish()
    }
}
