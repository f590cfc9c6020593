//! Send command handler
//!
//! Builds the dispatcher from settings and runs one send, or prints the
//! resolved plan for `--dry-run`.

use std::sync::Arc;

use tracing::warn;

use crate::config::settings::Settings;
use crate::error::AppResult;
use crate::models::{DeliveryFields, NotificationRequest, Outcome, ResolvedConfig};
use crate::services::notifications::{Dispatcher, PlannedDelivery, ProviderRegistry};
use crate::suppression::SuppressionStore;

/// Handler for sending a notification
pub struct SendCommandHandler {
    config: Settings,
    registry: ProviderRegistry,
}

impl SendCommandHandler {
    /// Create a handler with the built-in providers
    pub fn new(config: Settings) -> Self {
        let registry = ProviderRegistry::from_config(&config.delivery);
        Self { config, registry }
    }

    /// Create a handler with a custom provider registry
    pub fn with_registry(config: Settings, registry: ProviderRegistry) -> Self {
        Self { config, registry }
    }

    /// Send the notification
    ///
    /// The suppression store is only opened when the request asks for
    /// suppression. A store that cannot be opened is logged and skipped.
    ///
    /// # Errors
    /// Configuration errors from preflight; delivery failures are in the Outcome
    pub async fn execute(
        &self,
        request: &NotificationRequest,
        resolved: &ResolvedConfig,
    ) -> AppResult<Outcome> {
        let store = if request.suppression_interval().is_some() {
            self.open_store()
        } else {
            None
        };

        self.dispatcher(store).send(request, resolved).await
    }

    /// Resolve the plan and print it without contacting any backend or store
    pub fn dry_run(
        &self,
        request: &NotificationRequest,
        resolved: &ResolvedConfig,
    ) -> AppResult<Vec<PlannedDelivery>> {
        let plan = self.dispatcher(None).plan(request, resolved)?;

        println!("✓ Configuration is valid");
        println!("✓ Dispatch mode: {:?}", self.config.dispatch.mode);
        match request.suppression_interval() {
            Some(interval) => println!(
                "✓ Suppression: {}s via {:?} store",
                interval.as_secs(),
                self.config.suppression.backend
            ),
            None => println!("✓ Suppression: off"),
        }
        for delivery in &plan {
            println!(
                "✓ Would send via {} ({}) key {}",
                delivery.backend,
                describe_fields(&delivery.fields),
                delivery.key
            );
        }
        println!("Dry run completed successfully - nothing was sent");

        Ok(plan)
    }

    fn dispatcher(&self, store: Option<Arc<SuppressionStore>>) -> Dispatcher {
        let dispatcher = Dispatcher::new(self.registry.clone())
            .with_mode(self.config.dispatch.mode)
            .with_key_prefix(self.config.suppression.key_prefix.clone());

        match store {
            Some(store) => dispatcher.with_store(store),
            None => dispatcher,
        }
    }

    fn open_store(&self) -> Option<Arc<SuppressionStore>> {
        match SuppressionStore::from_config(&self.config.suppression) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Suppression store unavailable, sending without suppression");
                None
            }
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}

/// Field summary for dry-run output; credentials are not printed
fn describe_fields(fields: &DeliveryFields) -> String {
    match fields {
        DeliveryFields::Pushover(f) => match &f.title {
            Some(title) => format!("title: {}", title),
            None => "no title".to_string(),
        },
        DeliveryFields::Email(f) => format!(
            "to: {}, subject: {}, sender: {}",
            f.to,
            f.subject,
            f.sender.as_deref().unwrap_or("default")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::{ServiceEntry, SuppressionBackendKind};
    use crate::models::{BackendKind, OutcomeStatus, PushoverFields};
    use crate::services::notifications::NotificationProvider;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl NotificationProvider for CountingProvider {
        async fn deliver(&self, _message: &str, _fields: &DeliveryFields) -> AppResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn settings() -> Settings {
        let mut config = Settings::default();
        config.services = vec![ServiceEntry::new(
            "pushover",
            BTreeMap::from([
                ("app_token".to_string(), "A".to_string()),
                ("api_key".to_string(), "K".to_string()),
            ]),
        )];
        config.suppression.backend = SuppressionBackendKind::None;
        config
    }

    #[test]
    fn test_dry_run_returns_plan() {
        let config = settings();
        let resolved = ResolvedConfig::from_services(&config.services).unwrap();
        let handler = SendCommandHandler::new(config);

        let request = NotificationRequest::new("hi")
            .unwrap()
            .with_interval(Duration::from_secs(60));
        let plan = handler.dry_run(&request, &resolved).unwrap();

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].backend, BackendKind::Pushover);
    }

    #[test]
    fn test_dry_run_reports_missing_fields() {
        let mut config = settings();
        config.services.push(ServiceEntry::new("email", BTreeMap::new()));
        let resolved = ResolvedConfig::from_services(&config.services).unwrap();
        let handler = SendCommandHandler::new(config);

        let err = handler
            .dry_run(&NotificationRequest::new("hi").unwrap(), &resolved)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_describe_fields_hides_credentials() {
        let text = describe_fields(&DeliveryFields::Pushover(PushoverFields {
            app_token: "secret-token".to_string(),
            api_key: "secret-key".to_string(),
            title: Some("Backup".to_string()),
        }));
        assert_eq!(text, "title: Backup");
    }

    #[test]
    fn test_key_prefix_from_settings() {
        let mut config = settings();
        config.suppression.key_prefix = "host1".to_string();
        let resolved = ResolvedConfig::from_services(&config.services).unwrap();
        let handler = SendCommandHandler::new(config);

        let plan = handler
            .dry_run(&NotificationRequest::new("hi").unwrap(), &resolved)
            .unwrap();
        assert!(plan[0].key.as_str().starts_with("host1:"));
        assert_eq!(handler.config().suppression.key_prefix, "host1");
    }

    #[tokio::test]
    async fn test_execute_with_injected_registry() {
        let config = settings();
        let resolved = ResolvedConfig::from_services(&config.services).unwrap();
        let provider = Arc::new(CountingProvider::default());
        let registry =
            ProviderRegistry::new().with_provider(BackendKind::Pushover, provider.clone());
        let handler = SendCommandHandler::with_registry(config, registry);

        let request = NotificationRequest::new("hi")
            .unwrap()
            .with_interval(Duration::from_secs(60));
        for _ in 0..2 {
            let outcome = handler.execute(&request, &resolved).await.unwrap();
            assert_eq!(outcome.status(), OutcomeStatus::Delivered);
        }

        // The "none" store never suppresses
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }
}
