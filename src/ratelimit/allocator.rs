//! Slot claim allocation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::trace;
use uuid::Uuid;

use crate::store::{SlotStore, StoreError};

use super::slots::SlotKey;

/// Claims slots against the shared store.
///
/// The claim write is a single atomic set-if-absent with expiry, so two
/// callers racing for one slot can never both observe it created.
pub struct SlotAllocator {
    /// The shared store all callers coordinate through.
    store: Arc<dyn SlotStore>,
    /// Identifies this allocator in claim values. Diagnostics only; no
    /// decision reads it back.
    holder: Uuid,
}

impl SlotAllocator {
    /// Create an allocator over the given store.
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            store,
            holder: Uuid::new_v4(),
        }
    }

    /// Attempt to claim one slot for `ttl`.
    ///
    /// Returns `true` iff the slot was unoccupied and the claim was written.
    /// The claim self-vacates when its TTL runs out; there is no release
    /// path to forget.
    pub async fn try_claim(&self, key: &SlotKey, ttl: Duration) -> Result<bool, StoreError> {
        let value = format!("{} {}", self.holder, Utc::now().to_rfc3339());
        let claimed = self.store.set_if_absent(&key.to_string(), &value, ttl).await?;

        trace!(key = %key, claimed, "Slot claim attempted");
        Ok(claimed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_claim_succeeds_once() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SlotAllocator::new(store.clone());
        let key = SlotKey::new("test:slots:", 0);

        assert!(allocator.try_claim(&key, Duration::from_secs(10)).await.unwrap());
        assert!(!allocator.try_claim(&key, Duration::from_secs(10)).await.unwrap());
    }

    #[tokio::test]
    async fn test_claim_value_names_the_holder() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SlotAllocator::new(store.clone());
        let key = SlotKey::new("test:slots:", 0);

        allocator.try_claim(&key, Duration::from_secs(10)).await.unwrap();

        let value = store.get(&key.to_string()).unwrap();
        assert!(value.starts_with(&allocator.holder.to_string()));
    }

    #[tokio::test]
    async fn test_distinct_slots_claim_independently() {
        let store = Arc::new(MemoryStore::new());
        let allocator = SlotAllocator::new(store);

        for key in SlotKey::sequence("test:slots:", 3) {
            assert!(allocator.try_claim(&key, Duration::from_secs(10)).await.unwrap());
        }
    }
}
