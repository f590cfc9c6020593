//! Suppression store front that dispatches to the configured backend.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::settings::{SuppressionBackendKind, SuppressionConfig};
use crate::suppression::disk::DiskBackend;
use crate::suppression::memory::MemoryBackend;
use crate::suppression::noop::NoOpBackend;
use crate::suppression::redis::RedisBackend;
use crate::suppression::{SuppressionBackend, SuppressionError, SuppressionKey};

/// Best-effort suppression store.
///
/// Store errors never reach the caller: a failed lookup reports "not
/// suppressed" and a failed write is dropped, both with a warning.
#[derive(Clone)]
pub struct SuppressionStore {
    backend: Arc<dyn SuppressionBackend>,
}

impl SuppressionStore {
    /// Wrap an existing backend.
    pub fn new(backend: Arc<dyn SuppressionBackend>) -> Self {
        Self { backend }
    }

    /// Build the backend selected by `suppression.backend`.
    ///
    /// Must be called inside a Tokio runtime: the Redis pool starts its
    /// background reaper on creation.
    pub fn from_config(config: &SuppressionConfig) -> Result<Self, SuppressionError> {
        let backend: Arc<dyn SuppressionBackend> = match config.backend {
            SuppressionBackendKind::Redis => Arc::new(RedisBackend::new(&config.redis)?),
            SuppressionBackendKind::Disk => Arc::new(DiskBackend::new(&config.disk)?),
            SuppressionBackendKind::Memory => Arc::new(MemoryBackend::new(&config.memory)),
            SuppressionBackendKind::None => Arc::new(NoOpBackend::new()),
        };

        debug!(backend = backend.name(), "Suppression store ready");
        Ok(Self { backend })
    }

    /// Get a reference to the store backend.
    pub fn backend(&self) -> &Arc<dyn SuppressionBackend> {
        &self.backend
    }

    /// Whether a live record exists for `key`. Errors count as "no".
    pub async fn is_suppressed(&self, key: &SuppressionKey) -> bool {
        match self.backend.exists(key.as_str()).await {
            Ok(found) => found,
            Err(e) => {
                warn!(
                    store = self.backend.name(),
                    error = %e,
                    "Suppression lookup failed, sending anyway"
                );
                false
            }
        }
    }

    /// Record a successful send so repeats within `interval` are skipped.
    ///
    /// Does nothing for an absent or zero interval. Sub-second intervals are
    /// rounded up to one second.
    pub async fn mark_sent(&self, key: &SuppressionKey, interval: Option<Duration>) {
        let Some(interval) = interval.filter(|i| !i.is_zero()) else {
            return;
        };

        let ttl = interval
            .as_secs()
            .saturating_add(u64::from(interval.subsec_nanos() > 0));
        if let Err(e) = self.backend.set_with_expiry(key.as_str(), ttl).await {
            warn!(
                store = self.backend.name(),
                error = %e,
                "Failed to record suppression, repeats will not be suppressed"
            );
        }
    }
}

impl std::fmt::Debug for SuppressionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuppressionStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::DiskStoreConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that fails every call and counts them
    #[derive(Default)]
    struct BrokenBackend {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SuppressionBackend for BrokenBackend {
        async fn exists(&self, _key: &str) -> Result<bool, SuppressionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SuppressionError::Connection("connection refused".to_string()))
        }

        async fn set_with_expiry(&self, _key: &str, _ttl: u64) -> Result<(), SuppressionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(SuppressionError::Connection("connection refused".to_string()))
        }

        fn name(&self) -> &'static str {
            "broken"
        }
    }

    fn key(name: &str) -> SuppressionKey {
        use crate::models::{DeliveryFields, PushoverFields};
        SuppressionKey::derive(
            "test",
            name,
            &DeliveryFields::Pushover(PushoverFields {
                app_token: "A".to_string(),
                api_key: "K".to_string(),
                title: None,
            }),
        )
    }

    fn memory_store() -> SuppressionStore {
        SuppressionStore::from_config(&SuppressionConfig {
            backend: SuppressionBackendKind::Memory,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_mark_then_suppressed() {
        let store = memory_store();
        let key = key("hi");
        assert!(!store.is_suppressed(&key).await);
        store.mark_sent(&key, Some(Duration::from_secs(60))).await;
        assert!(store.is_suppressed(&key).await);
    }

    #[tokio::test]
    async fn test_mark_with_zero_interval_is_noop() {
        let store = memory_store();
        let key = key("hi");
        store.mark_sent(&key, Some(Duration::ZERO)).await;
        store.mark_sent(&key, None).await;
        assert!(!store.is_suppressed(&key).await);
    }

    #[tokio::test]
    async fn test_sub_second_interval_rounds_up() {
        let store = memory_store();
        let key = key("hi");
        store.mark_sent(&key, Some(Duration::from_millis(10))).await;
        assert!(store.is_suppressed(&key).await);
    }

    #[tokio::test]
    async fn test_broken_store_fails_open() {
        let backend = Arc::new(BrokenBackend::default());
        let store = SuppressionStore::new(backend.clone());
        let key = key("hi");

        assert!(!store.is_suppressed(&key).await);
        store.mark_sent(&key, Some(Duration::from_secs(60))).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_none_backend_never_suppresses() {
        let store = SuppressionStore::from_config(&SuppressionConfig {
            backend: SuppressionBackendKind::None,
            ..Default::default()
        })
        .unwrap();
        let key = key("hi");
        store.mark_sent(&key, Some(Duration::from_secs(60))).await;
        assert!(!store.is_suppressed(&key).await);
        assert_eq!(store.backend().name(), "none");
    }

    #[tokio::test]
    async fn test_maximum_interval_stays_suppressed() {
        let dir = tempfile::tempdir().unwrap();
        let disk = SuppressionStore::from_config(&SuppressionConfig {
            backend: SuppressionBackendKind::Disk,
            disk: DiskStoreConfig {
                directory: Some(dir.path().to_string_lossy().into_owned()),
            },
            ..Default::default()
        })
        .unwrap();

        for store in [memory_store(), disk] {
            let key = key("hi");
            store.mark_sent(&key, Some(Duration::MAX)).await;
            assert!(store.is_suppressed(&key).await, "{:?}", store);
        }
    }

    #[tokio::test]
    async fn test_redis_backend_builds_without_server() {
        let store = SuppressionStore::from_config(&SuppressionConfig::default()).unwrap();
        assert_eq!(store.backend().name(), "redis");
    }
}
