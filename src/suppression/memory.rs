//! In-process suppression store using cached::SizedCache.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cached::{Cached, SizedCache};

use crate::config::settings::MemoryStoreConfig;
use crate::suppression::{SuppressionBackend, SuppressionError};

/// Longest expiry an `Instant` is asked to represent (about 100 years)
const MAX_TTL_SECONDS: u64 = 100 * 365 * 86400;

/// Deadline `ttl_seconds` from now; larger values are clamped
fn deadline_after(ttl_seconds: u64) -> Instant {
    let now = Instant::now();
    let ttl = Duration::from_secs(ttl_seconds.min(MAX_TTL_SECONDS));
    now.checked_add(ttl)
        .or_else(|| now.checked_add(Duration::from_secs(86400 * 365)))
        .unwrap_or(now)
}

/// Size-bounded in-memory store. Entries carry their own deadline.
///
/// Only visible inside the current process; used for tests and embedding.
pub struct MemoryBackend {
    store: Mutex<SizedCache<String, Instant>>,
}

impl MemoryBackend {
    pub fn new(config: &MemoryStoreConfig) -> Self {
        Self {
            store: Mutex::new(SizedCache::with_size(config.max_size)),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new(&MemoryStoreConfig::default())
    }
}

#[async_trait]
impl SuppressionBackend for MemoryBackend {
    async fn exists(&self, key: &str) -> Result<bool, SuppressionError> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| SuppressionError::Operation(e.to_string()))?;

        let key_string = key.to_string();
        match store.cache_get(&key_string).copied() {
            Some(deadline) if Instant::now() < deadline => Ok(true),
            Some(_) => {
                store.cache_remove(&key_string);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn set_with_expiry(&self, key: &str, ttl_seconds: u64) -> Result<(), SuppressionError> {
        let mut store = self
            .store
            .lock()
            .map_err(|e| SuppressionError::Operation(e.to_string()))?;
        store.cache_set(key.to_string(), deadline_after(ttl_seconds));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_then_exists() {
        let backend = MemoryBackend::default();
        assert!(!backend.exists("key").await.unwrap());
        backend.set_with_expiry("key", 60).await.unwrap();
        assert!(backend.exists("key").await.unwrap());
        assert!(!backend.exists("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_already_expired() {
        let backend = MemoryBackend::default();
        backend.set_with_expiry("key", 0).await.unwrap();
        assert!(!backend.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_record_expires() {
        let backend = MemoryBackend::default();
        backend.set_with_expiry("key", 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(!backend.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_ttl_is_clamped() {
        let backend = MemoryBackend::default();
        backend.set_with_expiry("key", u64::MAX).await.unwrap();
        assert!(backend.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_size_bound_evicts_oldest() {
        let backend = MemoryBackend::new(&MemoryStoreConfig { max_size: 1 });
        backend.set_with_expiry("first", 60).await.unwrap();
        backend.set_with_expiry("second", 60).await.unwrap();
        assert!(!backend.exists("first").await.unwrap());
        assert!(backend.exists("second").await.unwrap());
    }
}
