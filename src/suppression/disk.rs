//! Disk suppression store with per-entry expiry.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use cached::IOCached;
use cached::stores::DiskCache;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::settings::DiskStoreConfig;
use crate::suppression::{SuppressionBackend, SuppressionError};

const STORE_NAME: &str = "suppression";

#[derive(Serialize, Deserialize)]
struct SuppressionRecord {
    expires_at: u64, // Unix timestamp in seconds
}

impl SuppressionRecord {
    fn is_expired(&self) -> bool {
        unix_now() >= self.expires_at
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Suppression records kept in an on-disk store, shared by every invocation
/// on the same host.
pub struct DiskBackend {
    store: Mutex<DiskCache<String, SuppressionRecord>>,
}

impl DiskBackend {
    /// Open the store. Fails while another process holds the store lock.
    pub fn new(config: &DiskStoreConfig) -> Result<Self, SuppressionError> {
        // Expiry is tracked per record; the store-wide lifespan is only an upper bound
        let store = DiskCache::new(STORE_NAME)
            .set_disk_directory(config.resolved_directory())
            .set_lifespan(Duration::from_secs(86400 * 365))
            .build()
            .map_err(|e| SuppressionError::Connection(e.to_string()))?;

        Ok(Self {
            store: Mutex::new(store),
        })
    }
}

#[async_trait]
impl SuppressionBackend for DiskBackend {
    async fn exists(&self, key: &str) -> Result<bool, SuppressionError> {
        let key_string = key.to_string();
        let store = self.store.lock().await;

        let record = store
            .cache_get(&key_string)
            .map_err(|e| SuppressionError::Operation(e.to_string()))?;

        match record {
            Some(record) if !record.is_expired() => Ok(true),
            Some(_) => {
                if let Err(e) = store.cache_remove(&key_string) {
                    debug!(key, error = %e, "Failed to remove expired suppression record");
                }
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn set_with_expiry(&self, key: &str, ttl_seconds: u64) -> Result<(), SuppressionError> {
        let store = self.store.lock().await;

        let record = SuppressionRecord {
            expires_at: unix_now().saturating_add(ttl_seconds),
        };

        store
            .cache_set(key.to_string(), record)
            .map_err(|e| SuppressionError::Operation(e.to_string()))?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}
