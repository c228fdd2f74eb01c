//! The process-wide waystone directory.
//!
//! An in-memory cache of every currently active waystone, keyed by identity
//! hash. The directory is rebuilt from block entities already present in
//! loaded world state at session start; it is never itself authoritative for
//! durability. Membership here is the single source of truth for
//! "teleportable".
//!
//! All mutation flows through `&mut self`, so whoever owns the directory
//! (the server session) is the single writer. Embedders whose transport runs
//! on multiple threads must wrap the owner in a mutex; the directory carries
//! no internal locking.

use crate::record::WaystoneRecord;
use std::collections::BTreeMap;
use tracing::debug;
use waystones_core::WaystoneId;

/// Registry of all currently active waystones.
///
/// Keys are ordered, so iteration and client sync snapshots are
/// deterministic across runs.
#[derive(Debug, Default, Clone)]
pub struct WaystoneDirectory {
    records: BTreeMap<WaystoneId, WaystoneRecord>,
}

impl WaystoneDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a waystone. First registration wins: when the id is already
    /// present the call is a no-op returning `false` and the existing
    /// record's fields are left untouched, which makes near-simultaneous
    /// registration by two interacting players safe.
    pub fn add(&mut self, record: WaystoneRecord) -> bool {
        match self.records.entry(record.id.clone()) {
            std::collections::btree_map::Entry::Occupied(_) => false,
            std::collections::btree_map::Entry::Vacant(slot) => {
                debug!(id = %record.id, pos = %record.pos, "waystone registered");
                slot.insert(record);
                true
            }
        }
    }

    /// Remove a waystone. Idempotent: removing an absent id is a no-op
    /// returning `None`. Discovery sets are deliberately not purged; a stale
    /// reference simply resolves to not-found from then on.
    pub fn remove(&mut self, id: &WaystoneId) -> Option<WaystoneRecord> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            debug!(%id, "waystone removed");
        }
        removed
    }

    /// Rename a waystone. Returns `false` (no-op) when the id is absent.
    /// The identity hash never changes with the label; broadcasting the new
    /// label to viewing clients is the caller's job.
    pub fn rename(&mut self, id: &WaystoneId, new_name: &str) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.display_name = new_name.to_string();
                true
            }
            None => false,
        }
    }

    /// Look up a live record.
    pub fn resolve(&self, id: &WaystoneId) -> Option<&WaystoneRecord> {
        self.records.get(id)
    }

    /// Whether the id refers to a live waystone.
    pub fn contains(&self, id: &WaystoneId) -> bool {
        self.records.contains_key(id)
    }

    /// Ordered snapshot of every record, for full-directory client sync.
    pub fn snapshot(&self) -> Vec<WaystoneRecord> {
        self.records.values().cloned().collect()
    }

    /// Iterate records in id order.
    pub fn iter(&self) -> impl Iterator<Item = &WaystoneRecord> {
        self.records.values()
    }

    /// Number of live waystones.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the directory holds no waystones.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Reconstruct the directory from block-entity records collected out of
    /// loaded world state at session start. Duplicate ids keep the first
    /// record seen, same as [`WaystoneDirectory::add`].
    pub fn rebuild(&mut self, records: impl IntoIterator<Item = WaystoneRecord>) {
        self.records.clear();
        let mut count = 0usize;
        for record in records {
            if self.add(record) {
                count += 1;
            }
        }
        debug!(count, "directory rebuilt from block entities");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waystones_core::{DimensionId, WaystonePos};

    fn record_at(x: i32, salt: u64) -> WaystoneRecord {
        WaystoneRecord::place(WaystonePos::new(DimensionId::Overworld, x, 64, 0), salt)
    }

    #[test]
    fn first_registration_wins() {
        let mut dir = WaystoneDirectory::new();
        let mut first = record_at(10, 1);
        first.display_name = "Home".to_string();
        let mut second = first.clone();
        second.display_name = "Imposter".to_string();

        assert!(dir.add(first.clone()));
        assert!(!dir.add(second));
        assert_eq!(dir.resolve(&first.id).unwrap().display_name, "Home");
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut dir = WaystoneDirectory::new();
        let record = record_at(10, 1);
        let id = record.id.clone();
        dir.add(record);

        assert!(dir.remove(&id).is_some());
        assert!(dir.remove(&id).is_none());
        assert!(!dir.contains(&id));
        assert!(dir.resolve(&id).is_none());
    }

    #[test]
    fn rename_updates_label_only() {
        let mut dir = WaystoneDirectory::new();
        let record = record_at(10, 1);
        let id = record.id.clone();
        let pos = record.pos;
        dir.add(record);

        assert!(dir.rename(&id, "Home"));
        let renamed = dir.resolve(&id).unwrap();
        assert_eq!(renamed.display_name, "Home");
        assert_eq!(renamed.id, id);
        assert_eq!(renamed.pos, pos);
    }

    #[test]
    fn rename_absent_is_noop() {
        let mut dir = WaystoneDirectory::new();
        let ghost = record_at(1, 1).id;
        assert!(!dir.rename(&ghost, "Home"));
    }

    #[test]
    fn snapshot_is_id_ordered() {
        let mut dir = WaystoneDirectory::new();
        for x in 0..8 {
            dir.add(record_at(x, x as u64));
        }
        let snapshot = dir.snapshot();
        let ids: Vec<_> = snapshot.iter().map(|r| r.id.clone()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids, sorted);
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut dir = WaystoneDirectory::new();
        dir.add(record_at(1, 1));
        let replacement = record_at(2, 2);
        let id = replacement.id.clone();

        dir.rebuild([replacement]);
        assert_eq!(dir.len(), 1);
        assert!(dir.contains(&id));
    }
}
