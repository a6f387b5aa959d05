//! Slot key derivation.

use std::fmt;

/// Address of one slot within a namespace's pool.
///
/// Indices are dense: a window allowing `ops` operations maps to indices
/// `0..ops`, so every caller sharing the namespace converges on the same key
/// sequence. Changing `ops` between calls against one namespace changes the
/// addressable range; claims made under the old range linger until their TTL
/// runs out and are never reindexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SlotKey {
    /// Key prefix partitioning independent slot pools.
    pub namespace: String,
    /// Slot index within the pool.
    pub index: u32,
}

impl SlotKey {
    /// Create the key for one slot.
    pub fn new(namespace: &str, index: u32) -> Self {
        Self {
            namespace: namespace.to_string(),
            index,
        }
    }

    /// Derive the key sequence for a pool of `ops` slots, in ascending
    /// index order.
    ///
    /// Purely derived from its inputs so that independent callers scan the
    /// same addresses in the same order.
    pub fn sequence(namespace: &str, ops: u32) -> Vec<SlotKey> {
        (0..ops).map(|index| SlotKey::new(namespace, index)).collect()
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_is_dense_and_ordered() {
        let keys = SlotKey::sequence("svc:slots:", 4);

        assert_eq!(keys.len(), 4);
        for (index, key) in keys.iter().enumerate() {
            assert_eq!(key.index, index as u32);
            assert_eq!(key.namespace, "svc:slots:");
        }
    }

    #[test]
    fn test_sequence_is_deterministic() {
        assert_eq!(
            SlotKey::sequence("svc:slots:", 8),
            SlotKey::sequence("svc:slots:", 8)
        );
    }

    #[test]
    fn test_key_display() {
        assert_eq!(SlotKey::new("svc:slots:", 3).to_string(), "svc:slots:3");
        // Indices past 9 keep the plain decimal form.
        assert_eq!(SlotKey::new("svc:slots:", 12).to_string(), "svc:slots:12");
    }
}
