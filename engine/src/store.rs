//! Record store - the ordered in-memory collection of inspections.
//!
//! The store is the single source of truth for what is displayed and
//! persisted. Records keep their insertion order: new ids are appended and
//! edits replace a record where it already sits.

use crate::{Inspection, RecordId};
use std::collections::HashMap;

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The id was new and the record was appended
    Inserted,
    /// A record with the same id was replaced in place
    Replaced,
}

/// Ordered collection of inspections with unique ids.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Inspection>,
    /// Position of each id in `records`
    index: HashMap<RecordId, usize>,
}

impl RecordStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store by upserting records in order. Later duplicates
    /// replace earlier ones at the earlier position.
    pub fn from_records(records: impl IntoIterator<Item = Inspection>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.upsert(record);
        }
        store
    }

    /// Insert a new record or replace the one with the same id.
    pub fn upsert(&mut self, record: Inspection) -> Upsert {
        match self.index.get(&record.id) {
            Some(&pos) => {
                self.records[pos] = record;
                Upsert::Replaced
            }
            None => {
                self.index.insert(record.id, self.records.len());
                self.records.push(record);
                Upsert::Inserted
            }
        }
    }

    /// Get a record by id.
    pub fn get(&self, id: RecordId) -> Option<&Inspection> {
        self.index.get(&id).map(|&pos| &self.records[pos])
    }

    /// All records in insertion order.
    pub fn all(&self) -> &[Inspection] {
        &self.records
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.index.contains_key(&id)
    }

    /// Set the sync flag of a record. Returns false if the id is unknown.
    pub fn set_synced(&mut self, id: RecordId, synced: bool) -> bool {
        match self.index.get(&id) {
            Some(&pos) => {
                self.records[pos].synced = synced;
                true
            }
            None => false,
        }
    }

    /// Highest id in the store.
    pub fn max_id(&self) -> Option<RecordId> {
        self.index.keys().copied().max()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InspectionStatus;

    fn inspection(id: RecordId, site: &str) -> Inspection {
        Inspection::new(id, site, "Inspector", "2025-11-19", InspectionStatus::Pending)
    }

    #[test]
    fn upsert_appends_new_ids() {
        let mut store = RecordStore::new();
        assert_eq!(store.upsert(inspection(10, "A")), Upsert::Inserted);
        assert_eq!(store.upsert(inspection(5, "B")), Upsert::Inserted);

        let ids: Vec<_> = store.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 5]);
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut store = RecordStore::new();
        store.upsert(inspection(1, "A"));
        store.upsert(inspection(2, "B"));
        store.upsert(inspection(3, "C"));

        assert_eq!(store.upsert(inspection(2, "B edited")), Upsert::Replaced);

        assert_eq!(store.len(), 3);
        assert_eq!(store.all()[1].site, "B edited");
        let ids: Vec<_> = store.all().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn get_by_id() {
        let store = RecordStore::from_records(vec![inspection(1, "A"), inspection(2, "B")]);
        assert_eq!(store.get(2).unwrap().site, "B");
        assert!(store.get(3).is_none());
    }

    #[test]
    fn from_records_collapses_duplicates() {
        let store = RecordStore::from_records(vec![
            inspection(1, "first"),
            inspection(2, "B"),
            inspection(1, "second"),
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.all()[0].site, "second");
    }

    #[test]
    fn set_synced_flag() {
        let mut store = RecordStore::from_records(vec![inspection(1, "A")]);
        assert!(store.set_synced(1, true));
        assert!(store.get(1).unwrap().synced);
        assert!(!store.set_synced(99, true));
    }

    #[test]
    fn max_id() {
        assert_eq!(RecordStore::new().max_id(), None);
        let store = RecordStore::from_records(vec![inspection(4, "A"), inspection(9, "B")]);
        assert_eq!(store.max_id(), Some(9));
    }
}
