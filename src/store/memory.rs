//! In-memory slot store.
//!
//! Mirrors the TTL semantics of the shared backend for tests and
//! single-process embedding. Entries expire lazily: an expired entry is
//! treated as absent and replaced by the next claim.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::time::Instant;

use super::{SlotStore, StoreError};

/// A claim value with its expiry deadline.
#[derive(Debug, Clone)]
struct Claim {
    value: String,
    expires_at: Instant,
}

impl Claim {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory slot store backed by a concurrent map.
///
/// `set_if_absent` holds the map shard's write lock for the whole
/// check-and-insert, so racing claims on one key serialize exactly as they
/// do against the shared backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    claims: DashMap<String, Claim>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            claims: DashMap::new(),
        }
    }

    /// Current value for a key, if unexpired.
    ///
    /// Not part of the store contract; used for inspecting claims in tests.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.claims
            .get(key)
            .filter(|claim| !claim.is_expired(now))
            .map(|claim| claim.value.clone())
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let now = Instant::now();
        Ok(self
            .claims
            .get(key)
            .map(|claim| !claim.is_expired(now))
            .unwrap_or(false))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let now = Instant::now();
        let claim = Claim {
            value: value.to_string(),
            expires_at: now + ttl,
        };

        match self.claims.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_expired(now) => {
                occupied.insert(claim);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(claim);
                Ok(true)
            }
        }
    }

    async fn flush(&self) -> Result<(), StoreError> {
        self.claims.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_occupies_slot() {
        let store = MemoryStore::new();

        assert!(store
            .set_if_absent("slot:0", "first", Duration::from_secs(10))
            .await
            .unwrap());
        assert!(store.exists("slot:0").await.unwrap());

        // Occupied slot rejects the second claim and keeps the first value.
        assert!(!store
            .set_if_absent("slot:0", "second", Duration::from_secs(10))
            .await
            .unwrap());
        assert_eq!(store.get("slot:0"), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_expiry_frees_slot() {
        tokio::time::pause();
        let store = MemoryStore::new();

        store
            .set_if_absent("slot:0", "first", Duration::from_secs(5))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(store.exists("slot:0").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.exists("slot:0").await.unwrap());

        // The expired entry is replaced by the next claim.
        assert!(store
            .set_if_absent("slot:0", "second", Duration::from_secs(5))
            .await
            .unwrap());
        assert_eq!(store.get("slot:0"), Some("second".to_string()));
    }

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let store = MemoryStore::new();
        assert!(!store.exists("slot:0").await.unwrap());
        assert_eq!(store.get("slot:0"), None);
    }

    #[tokio::test]
    async fn test_flush_clears_all_claims() {
        let store = MemoryStore::new();

        for index in 0..4 {
            store
                .set_if_absent(&format!("slot:{index}"), "x", Duration::from_secs(10))
                .await
                .unwrap();
        }

        store.flush().await.unwrap();

        for index in 0..4 {
            assert!(!store.exists(&format!("slot:{index}")).await.unwrap());
        }
    }
}
