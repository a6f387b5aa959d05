//! Slot store backends.
//!
//! The limiter coordinates across process boundaries through a shared,
//! TTL-capable key-value store. This module defines the minimal contract the
//! limiter consumes and the backends that implement it.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

/// Errors that can occur in slot store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to reach the store.
    #[error("Store connection error: {0}")]
    Connection(String),

    /// The store failed or rejected a command.
    #[error("Store query error: {0}")]
    Query(String),
}

/// Contract for the shared slot store.
///
/// A slot is occupied while the store holds an unexpired entry for its key
/// and becomes free again through TTL expiry alone; there is no delete path.
#[async_trait]
pub trait SlotStore: Send + Sync {
    /// Whether an unexpired entry exists for the key.
    ///
    /// Informational only. Claim decisions go through
    /// [`set_if_absent`](SlotStore::set_if_absent), which is atomic; a
    /// separate check-then-write sequence would let two racing callers both
    /// observe an empty slot and both claim it.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Create an entry iff the key is currently unoccupied.
    ///
    /// Returns `true` iff this call created the entry. The entry expires
    /// `ttl` after creation.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
        -> Result<bool, StoreError>;

    /// Remove every key. Test and demo use only.
    async fn flush(&self) -> Result<(), StoreError>;
}
