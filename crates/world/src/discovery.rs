//! Per-player discovered-waystone tracking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use waystones_core::WaystoneId;

/// The set of waystone ids a player has unlocked.
///
/// Persists with the owning player entity. Entries may outlive the waystone
/// they reference (the block was broken); resolution treats those as
/// not-found rather than pruning them here, and "forget" stays an explicit
/// player action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySet {
    known: BTreeSet<WaystoneId>,
}

impl DiscoverySet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unlock a waystone. Idempotent; returns `true` when the set changed.
    pub fn discover(&mut self, id: WaystoneId) -> bool {
        self.known.insert(id)
    }

    /// Drop a waystone from the set. Idempotent; returns `true` when the
    /// set changed.
    pub fn forget(&mut self, id: &WaystoneId) -> bool {
        self.known.remove(id)
    }

    /// Whether this player has unlocked the given id.
    pub fn contains(&self, id: &WaystoneId) -> bool {
        self.known.contains(id)
    }

    /// Ordered snapshot of everything discovered, for client sync.
    pub fn list_discovered(&self) -> Vec<WaystoneId> {
        self.known.iter().cloned().collect()
    }

    /// Iterate known ids in order.
    pub fn iter(&self) -> impl Iterator<Item = &WaystoneId> {
        self.known.iter()
    }

    /// Number of discovered waystones.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether nothing has been discovered yet.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waystones_core::{compute_id, DimensionId, WaystonePos};

    fn id(salt: u64) -> WaystoneId {
        compute_id(WaystonePos::new(DimensionId::Overworld, 0, 64, 0), salt)
    }

    #[test]
    fn discover_and_forget_are_idempotent() {
        let mut set = DiscoverySet::new();
        assert!(set.discover(id(1)));
        assert!(!set.discover(id(1)));
        assert_eq!(set.len(), 1);

        assert!(set.forget(&id(1)));
        assert!(!set.forget(&id(1)));
        assert!(set.is_empty());
    }

    #[test]
    fn snapshot_is_ordered() {
        let mut set = DiscoverySet::new();
        for salt in [9, 3, 7, 1] {
            set.discover(id(salt));
        }
        let listed = set.list_discovered();
        let mut sorted = listed.clone();
        sorted.sort();
        assert_eq!(listed, sorted);
    }
}
