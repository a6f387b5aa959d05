//! Redis-backed slot store.
//!
//! Claims map to plain Redis keys written with `SET NX PX`, so the
//! check-and-claim step is a single atomic command and slot release is
//! Redis-side key expiry. Connections come from a deadpool pool shared by
//! all callers in the process.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::RedisError;
use tracing::debug;

use crate::config::StoreConfig;

use super::{SlotStore, StoreError};

/// Redis-backed slot store.
pub struct RedisStore {
    /// Redis connection pool.
    pool: Pool,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with a PING.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut redis_config = deadpool_redis::Config {
            url: Some(config.url.clone()),
            ..Default::default()
        };

        if let Some(max_size) = config.pool_max_size {
            let mut pool_config = deadpool_redis::PoolConfig::default();
            pool_config.max_size = max_size;
            redis_config.pool = Some(pool_config);
        }

        let pool = redis_config.create_pool(Some(Runtime::Tokio1)).map_err(|e| {
            StoreError::Connection(format!("Failed to create Redis connection pool: {e}"))
        })?;

        let mut conn = pool.get().await.map_err(|e| {
            StoreError::Connection(format!("Failed to get Redis connection from pool: {e}"))
        })?;

        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to ping Redis server: {e}")))?;

        debug!(url = %config.url, "Connected to Redis slot store");

        Ok(Self { pool })
    }

    async fn connection(&self) -> Result<deadpool_redis::Connection, StoreError> {
        self.pool
            .get()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))
    }
}

/// Redis expiries are integral milliseconds; round sub-millisecond TTLs up
/// so a claim never lands already expired.
fn ttl_millis(ttl: Duration) -> u64 {
    (ttl.as_millis() as u64).max(1)
}

#[async_trait]
impl SlotStore for RedisStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;

        let found: bool = redis::cmd("EXISTS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e: RedisError| StoreError::Query(e.to_string()))?;

        Ok(found)
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let mut conn = self.connection().await?;

        // NX and PX in one SET: either this call creates the entry with its
        // expiry, or the slot was already held and nothing is written.
        let created: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e: RedisError| StoreError::Query(e.to_string()))?;

        Ok(created.is_some())
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;

        let _: () = redis::cmd("FLUSHDB")
            .query_async(&mut conn)
            .await
            .map_err(|e: RedisError| StoreError::Query(e.to_string()))?;

        Ok(())
    }
}
