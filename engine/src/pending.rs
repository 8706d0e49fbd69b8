//! Pending-sync set - record ids awaiting acknowledgement by the remote.
//!
//! Membership is a set, but every entry also remembers the save revision
//! that put it there. A sync snapshots `(id, revision)` pairs when it
//! starts and only clears entries whose revision is unchanged when it
//! completes, so a record saved again while the sync was in flight stays
//! pending.

use crate::RecordId;
use std::collections::BTreeMap;

/// Monotonic counter of offline saves within one session.
pub type Revision = u64;

/// Set of record ids awaiting sync.
#[derive(Debug, Clone, Default)]
pub struct PendingSync {
    entries: BTreeMap<RecordId, Revision>,
    next_revision: Revision,
}

impl PendingSync {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore membership from persisted ids.
    pub fn from_ids(ids: impl IntoIterator<Item = RecordId>) -> Self {
        let mut pending = Self::new();
        for id in ids {
            pending.mark_pending(id);
        }
        pending
    }

    /// Add an id. Idempotent for membership; the revision always advances.
    pub fn mark_pending(&mut self, id: RecordId) -> Revision {
        self.next_revision += 1;
        self.entries.insert(id, self.next_revision);
        self.next_revision
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Revision at which `id` was last marked.
    pub fn revision(&self, id: RecordId) -> Option<Revision> {
        self.entries.get(&id).copied()
    }

    /// Remove a single id.
    pub fn remove(&mut self, id: RecordId) -> bool {
        self.entries.remove(&id).is_some()
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Current `(id, revision)` pairs, ordered by id.
    pub fn snapshot(&self) -> Vec<(RecordId, Revision)> {
        self.entries.iter().map(|(&id, &rev)| (id, rev)).collect()
    }

    /// Remove the entries whose revision still matches the snapshot.
    ///
    /// Returns the ids that were removed.
    pub fn acknowledge(&mut self, snapshot: &[(RecordId, Revision)]) -> Vec<RecordId> {
        let mut cleared = Vec::with_capacity(snapshot.len());
        for &(id, rev) in snapshot {
            if self.entries.get(&id) == Some(&rev) {
                self.entries.remove(&id);
                cleared.push(id);
            }
        }
        cleared
    }

    /// Pending ids ordered by id.
    pub fn ids(&self) -> Vec<RecordId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
