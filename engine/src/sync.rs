//! Simulated sync with the remote.
//!
//! There is no network. A sync snapshots the pending set when it is
//! requested, waits out a fixed latency on the scheduler, then marks the
//! snapshotted records as acknowledged.
//!
//! # Algorithm
//!
//! 1. Refuse while offline; ignore while another sync is in flight;
//!    skip entirely when nothing is pending
//! 2. Snapshot `(id, revision)` for every pending entry
//! 3. After the latency, for each snapshotted entry whose revision is
//!    unchanged, set `synced = true` and drop it from the pending set
//! 4. Entries saved again during the latency stay pending

use crate::{
    clock, pending::Revision, PendingSync, RecordId, RecordStore, Timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifies one sync attempt.
pub type SyncTicket = u64;

/// A sync waiting for its simulated round trip to finish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlightSync {
    pub ticket: SyncTicket,
    pub started_at: Timestamp,
    pub completes_at: Timestamp,
    /// Pending entries captured when the sync was requested
    pub entries: Vec<(RecordId, Revision)>,
}

impl InFlightSync {
    pub fn new(
        ticket: SyncTicket,
        started_at: Timestamp,
        latency_ms: u64,
        entries: Vec<(RecordId, Revision)>,
    ) -> Self {
        Self {
            ticket,
            started_at,
            completes_at: started_at.saturating_add(latency_ms),
            entries,
        }
    }

    /// Ids captured by this sync.
    pub fn record_ids(&self) -> Vec<RecordId> {
        self.entries.iter().map(|&(id, _)| id).collect()
    }
}

/// What a sync request did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SyncRequest {
    /// A sync was started and will complete at `completes_at`
    #[serde(rename_all = "camelCase")]
    Started {
        ticket: SyncTicket,
        count: usize,
        completes_at: DateTime<Utc>,
    },
    /// Another sync is already in flight; this request was ignored
    AlreadyInFlight { ticket: SyncTicket },
    /// Nothing was pending; no state changed
    NothingToSync,
}

/// Result of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub ticket: SyncTicket,
    /// Records now marked synced
    pub synced: Vec<RecordId>,
    /// Records captured by the sync but saved again before it finished
    pub superseded: Vec<RecordId>,
    pub completed_at: DateTime<Utc>,
}

/// Apply a finished sync to the store and pending set.
pub fn complete(
    store: &mut RecordStore,
    pending: &mut PendingSync,
    flight: &InFlightSync,
    now: Timestamp,
) -> SyncReport {
    let cleared = pending.acknowledge(&flight.entries);

    let mut synced = Vec::with_capacity(cleared.len());
    for id in cleared {
        if store.set_synced(id, true) {
            synced.push(id);
        } else {
            tracing::warn!(record_id = id, "pending id had no record; dropped");
        }
    }

    let superseded = flight
        .entries
        .iter()
        .map(|&(id, _)| id)
        .filter(|id| pending.contains(*id))
        .collect();

    SyncReport {
        ticket: flight.ticket,
        synced,
        superseded,
        completed_at: clock::to_datetime(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Inspection, InspectionStatus};

    fn unsynced(id: RecordId) -> Inspection {
        Inspection::new(id, "Site", "Inspector", "2025-11-19", InspectionStatus::Pending)
    }

    #[test]
    fn completes_at_after_latency() {
        let flight = InFlightSync::new(1, 1000, 1500, vec![]);
        assert_eq!(flight.completes_at, 2500);
    }

    #[test]
    fn marks_snapshotted_records_synced() {
        let mut store = RecordStore::from_records(vec![unsynced(1), unsynced(2)]);
        let mut pending = PendingSync::from_ids([1, 2]);
        let flight = InFlightSync::new(1, 0, 1500, pending.snapshot());

        let report = complete(&mut store, &mut pending, &flight, 1500);

        assert_eq!(report.synced, vec![1, 2]);
        assert!(report.superseded.is_empty());
        assert!(pending.is_empty());
        assert!(store.all().iter().all(|r| r.synced));
    }

    #[test]
    fn ids_added_during_flight_stay_pending() {
        let mut store = RecordStore::from_records(vec![unsynced(1), unsynced(2)]);
        let mut pending = PendingSync::from_ids([1]);
        let flight = InFlightSync::new(1, 0, 1500, pending.snapshot());

        pending.mark_pending(2);
        let report = complete(&mut store, &mut pending, &flight, 1500);

        assert_eq!(report.synced, vec![1]);
        assert_eq!(pending.ids(), vec![2]);
        assert!(!store.get(2).unwrap().synced);
    }

    #[test]
    fn resaved_record_is_superseded() {
        let mut store = RecordStore::from_records(vec![unsynced(1)]);
        let mut pending = PendingSync::from_ids([1]);
        let flight = InFlightSync::new(1, 0, 1500, pending.snapshot());

        pending.mark_pending(1);
        let report = complete(&mut store, &mut pending, &flight, 1500);

        assert!(report.synced.is_empty());
        assert_eq!(report.superseded, vec![1]);
        assert!(pending.contains(1));
        assert!(!store.get(1).unwrap().synced);
    }

    #[test]
    fn orphaned_pending_id_is_dropped() {
        let mut store = RecordStore::new();
        let mut pending = PendingSync::from_ids([5]);
        let flight = InFlightSync::new(1, 0, 1500, pending.snapshot());

        let report = complete(&mut store, &mut pending, &flight, 1500);

        assert!(report.synced.is_empty());
        assert!(pending.is_empty());
    }

    #[test]
    fn request_outcome_wire_format() {
        let json = serde_json::to_value(SyncRequest::NothingToSync).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "nothing_to_sync"}));

        let json = serde_json::to_value(SyncRequest::Started {
            ticket: 3,
            count: 2,
            completes_at: clock::to_datetime(1500),
        })
        .unwrap();
        assert_eq!(json["outcome"], "started");
        assert_eq!(json["count"], 2);
        assert_eq!(json["completesAt"], "1970-01-01T00:00:01.500Z");
    }
}
