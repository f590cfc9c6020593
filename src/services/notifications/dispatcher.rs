//! Notification dispatcher.
//!
//! Resolves the target backends of a request, checks suppression, and hands
//! the merged fields to each backend's provider in order.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::registry::ProviderRegistry;
use crate::config::{DispatchMode, SuppressionConfig};
use crate::error::{AppError, AppResult};
use crate::models::{
    BackendKind, BackendOutcome, DeliveryFields, NotificationRequest, Outcome, ResolvedConfig,
};
use crate::suppression::{SuppressionKey, SuppressionStore};

/// One backend send that passed preflight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDelivery {
    pub backend: BackendKind,
    pub fields: DeliveryFields,
    pub key: SuppressionKey,
}

/// Routes notifications to providers
///
/// # Example
/// ```ignore
/// let dispatcher = Dispatcher::new(ProviderRegistry::from_config(&settings.delivery))
///     .with_store(Arc::new(store))
///     .with_mode(settings.dispatch.mode);
/// let outcome = dispatcher.send(&request, &resolved).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: ProviderRegistry,
    store: Option<Arc<SuppressionStore>>,
    mode: DispatchMode,
    key_prefix: String,
}

impl Dispatcher {
    /// Dispatcher in fan-out mode with no suppression store
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            store: None,
            mode: DispatchMode::default(),
            key_prefix: SuppressionConfig::default().key_prefix,
        }
    }

    pub fn with_store(mut self, store: Arc<SuppressionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_key_prefix(mut self, key_prefix: impl Into<String>) -> Self {
        self.key_prefix = key_prefix.into();
        self
    }

    /// Resolve targets and merge their fields without sending anything.
    ///
    /// Targets are the explicitly requested backend, or every enabled backend
    /// in configuration order.
    ///
    /// # Errors
    /// `AppError::Configuration` for an unknown or unconfigured backend, no
    /// enabled backend, a missing required field or a missing provider.
    pub fn plan(
        &self,
        request: &NotificationRequest,
        config: &ResolvedConfig,
    ) -> AppResult<Vec<PlannedDelivery>> {
        let targets: Vec<BackendKind> = match request.backend() {
            Some(name) => {
                let kind: BackendKind = name.parse()?;
                if config.get(kind).is_none() {
                    return Err(AppError::configuration(
                        "backend",
                        format!("Service {} is not configured", kind),
                    ));
                }
                vec![kind]
            }
            None => config.enabled().to_vec(),
        };

        if targets.is_empty() {
            return Err(AppError::configuration(
                "services",
                "No enabled services, enable one or pass --backend",
            ));
        }

        targets
            .into_iter()
            .map(|backend| -> AppResult<PlannedDelivery> {
                let backend_config = config.get(backend).ok_or_else(|| {
                    AppError::configuration(
                        "services",
                        format!("Enabled service {} has no settings", backend),
                    )
                })?;
                let fields = backend_config.merge(request.overrides())?;
                self.registry.get(backend)?;
                let key = SuppressionKey::derive(&self.key_prefix, request.message(), &fields);

                Ok(PlannedDelivery {
                    backend,
                    fields,
                    key,
                })
            })
            .collect()
    }

    /// Send a notification.
    ///
    /// Configuration problems abort before any provider is called. Provider
    /// failures are recorded in the returned [`Outcome`] and never returned
    /// as errors.
    pub async fn send(
        &self,
        request: &NotificationRequest,
        config: &ResolvedConfig,
    ) -> AppResult<Outcome> {
        let plan = self.plan(request, config)?;
        let interval = request.suppression_interval();

        if interval.is_some() && self.store.is_none() {
            warn!("No suppression store available, sending without suppression");
        }

        let mut outcome = Outcome::new();

        for delivery in plan {
            let backend = delivery.backend;

            if let (Some(_), Some(store)) = (interval, &self.store)
                && store.is_suppressed(&delivery.key).await
            {
                info!(%backend, key = %delivery.key, "Notification suppressed");
                outcome.push(BackendOutcome::skipped(backend));
                if self.mode == DispatchMode::Failover {
                    break;
                }
                continue;
            }

            let provider = self.registry.get(backend)?;
            debug!(%backend, provider = provider.name(), "Delivering notification");

            match provider.deliver(request.message(), &delivery.fields).await {
                Ok(()) => {
                    info!(%backend, "Notification sent");
                    if let Some(store) = &self.store {
                        store.mark_sent(&delivery.key, interval).await;
                    }
                    outcome.push(BackendOutcome::sent(backend));
                    if self.mode == DispatchMode::Failover {
                        break;
                    }
                }
                Err(e) => {
                    error!(%backend, error = %e, "Notification delivery failed");
                    outcome.push(BackendOutcome::failed(backend, e.to_string()));
                }
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BackendConfig;
    use crate::services::notifications::NotificationProvider;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /// Provider that records every message it receives
    #[derive(Default)]
    struct RecordingProvider {
        delivered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl NotificationProvider for RecordingProvider {
        async fn deliver(&self, message: &str, _fields: &DeliveryFields) -> AppResult<()> {
            self.delivered.lock().unwrap().push(message.to_string());
            Ok(())
        }

        fn name(&self) -> &'static str {
            "recording"
        }
    }

    fn resolved() -> ResolvedConfig {
        let pushover = BackendConfig::new(
            BackendKind::Pushover,
            BTreeMap::from([
                ("app_token".to_string(), "A".to_string()),
                ("api_key".to_string(), "K".to_string()),
            ]),
        )
        .unwrap();
        let email = BackendConfig::new(BackendKind::Email, BTreeMap::new()).unwrap();
        ResolvedConfig::new(vec![pushover, email], vec![BackendKind::Pushover]).unwrap()
    }

    fn dispatcher(provider: Arc<RecordingProvider>) -> Dispatcher {
        Dispatcher::new(
            ProviderRegistry::new()
                .with_provider(BackendKind::Pushover, provider.clone())
                .with_provider(BackendKind::Email, provider),
        )
    }

    #[test]
    fn test_plan_enabled_backends() {
        let plan = dispatcher(Arc::default())
            .plan(&NotificationRequest::new("hi").unwrap(), &resolved())
            .unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].backend, BackendKind::Pushover);
        assert!(plan[0].key.as_str().starts_with("sendnotification:"));
    }

    #[test]
    fn test_plan_unknown_backend_name() {
        let request = NotificationRequest::new("hi").unwrap().with_backend("sms");
        let err = dispatcher(Arc::default()).plan(&request, &resolved()).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_plan_explicit_backend_missing_fields() {
        let request = NotificationRequest::new("hi").unwrap().with_backend("email");
        let err = dispatcher(Arc::default()).plan(&request, &resolved()).unwrap_err();
        assert!(err.to_string().contains("Missing setting for email subject"));
    }

    #[test]
    fn test_plan_without_provider() {
        let err = Dispatcher::new(ProviderRegistry::new())
            .plan(&NotificationRequest::new("hi").unwrap(), &resolved())
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_key_prefix_applies() {
        let plan = dispatcher(Arc::default())
            .with_key_prefix("host1")
            .plan(&NotificationRequest::new("hi").unwrap(), &resolved())
            .unwrap();
        assert!(plan[0].key.as_str().starts_with("host1:"));
    }

    #[tokio::test]
    async fn test_send_without_store_still_delivers() {
        let provider = Arc::new(RecordingProvider::default());
        let request = NotificationRequest::new("hi")
            .unwrap()
            .with_interval(std::time::Duration::from_secs(60));

        let dispatcher = dispatcher(provider.clone());
        for _ in 0..2 {
            let outcome = dispatcher.send(&request, &resolved()).await.unwrap();
            assert_eq!(outcome.sent_count(), 1);
        }
        assert_eq!(provider.delivered.lock().unwrap().len(), 2);
    }
}
