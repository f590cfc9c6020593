//! Redis suppression store using a bb8 connection pool.

use std::time::Duration;

use async_trait::async_trait;
use bb8::{Pool, PooledConnection};
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, RedisError};

use crate::config::settings::RedisStoreConfig;
use crate::suppression::{SuppressionBackend, SuppressionError};

type RedisPool = Pool<Client>;

/// Redis-backed suppression store shared between processes and hosts.
pub struct RedisBackend {
    pool: RedisPool,
}

impl RedisBackend {
    /// Create the backend. No connection is opened until the first command.
    ///
    /// Requires a running Tokio runtime, which the pool uses for its reaper task.
    pub fn new(config: &RedisStoreConfig) -> Result<Self, SuppressionError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| SuppressionError::Connection(e.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.pool_size)
            .connection_timeout(Duration::from_secs(config.connection_timeout))
            .build_unchecked(client);

        Ok(Self { pool })
    }

    async fn get_conn(&self) -> Result<PooledConnection<'_, Client>, SuppressionError> {
        self.pool
            .get()
            .await
            .map_err(|e| SuppressionError::Connection(e.to_string()))
    }
}

#[async_trait]
impl SuppressionBackend for RedisBackend {
    async fn exists(&self, key: &str) -> Result<bool, SuppressionError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .exists(key)
            .await
            .map_err(|e: RedisError| SuppressionError::Operation(e.to_string()))
    }

    async fn set_with_expiry(&self, key: &str, ttl_seconds: u64) -> Result<(), SuppressionError> {
        let mut conn: PooledConnection<'_, Client> = self.get_conn().await?;

        let conn_ref: &mut MultiplexedConnection = &mut conn;
        conn_ref
            .set_ex::<_, _, ()>(key, 1, ttl_seconds)
            .await
            .map_err(|e| SuppressionError::Operation(e.to_string()))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
