//! Persisted snapshot of a session.
//!
//! Snapshots are the bridge between the in-memory session and local
//! storage. The JSON layout is
//! `{"inspections": [...], "pendingSync": [ids], "lastSync": "<ISO-8601>"}`.

use crate::{default_inspections, error::Result, Error, Inspection, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point-in-time copy of everything the session persists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Records in display order. Missing on disk means "use the defaults";
    /// an empty array means an empty store.
    #[serde(default = "default_inspections")]
    pub inspections: Vec<Inspection>,
    /// Ids awaiting sync
    #[serde(default)]
    pub pending_sync: Vec<RecordId>,
    /// Completion time of the last successful sync
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn new(
        inspections: Vec<Inspection>,
        pending_sync: Vec<RecordId>,
        last_sync: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            inspections,
            pending_sync,
            last_sync,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Storage(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Storage(e.to_string()))
    }

    /// Deserialize from JSON. Anything that does not parse as a snapshot
    /// object is reported as [`Error::CorruptState`].
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::CorruptState(e.to_string()))
    }

    pub fn record_count(&self) -> usize {
        self.inspections.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending_sync.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock, InspectionStatus};

    fn sample() -> Snapshot {
        Snapshot::new(
            vec![
                Inspection::new(1, "Well Pad A-12", "John Smith", "2025-11-18", InspectionStatus::Completed)
                    .with_synced(true),
                Inspection::new(2, "X", "Current User", "2025-11-19", InspectionStatus::Pending)
                    .with_readings(Some(1500.0), None),
            ],
            vec![2],
            Some(clock::to_datetime(1_763_546_400_123)),
        )
    }

    #[test]
    fn json_roundtrip() {
        let snapshot = sample();
        let json = snapshot.to_json().unwrap();
        let restored = Snapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, restored);
    }

    #[test]
    fn json_layout() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert!(value["inspections"].is_array());
        assert_eq!(value["pendingSync"], serde_json::json!([2]));
        assert_eq!(value["lastSync"], "2025-11-19T10:00:00.123Z");
    }

    #[test]
    fn reads_browser_written_snapshot() {
        let json = r#"{
            "inspections": [
                {"id": 1, "site": "Well Pad A-12", "status": "completed",
                 "date": "2025-11-18", "inspector": "John Smith", "synced": true},
                {"id": 1763546400000, "site": "Tank Farm", "status": "pending",
                 "date": "2025-11-19", "inspector": "Current User",
                 "pressure": "1500", "temperature": "", "leaks": "none",
                 "notes": "", "synced": false}
            ],
            "pendingSync": [1763546400000],
            "lastSync": "2025-11-19T10:00:00.000Z"
        }"#;

        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.record_count(), 2);
        assert_eq!(snapshot.pending_sync, vec![1_763_546_400_000]);
        assert_eq!(snapshot.inspections[1].pressure, Some(1500.0));
        assert_eq!(
            snapshot.last_sync,
            Some(clock::to_datetime(1_763_546_400_000))
        );
    }

    #[test]
    fn missing_inspections_fall_back_to_defaults() {
        let snapshot = Snapshot::from_json(r#"{"pendingSync": []}"#).unwrap();
        assert_eq!(snapshot.inspections, default_inspections());
        assert!(snapshot.last_sync.is_none());
    }

    #[test]
    fn empty_inspections_stay_empty() {
        let snapshot = Snapshot::from_json(r#"{"inspections": []}"#).unwrap();
        assert!(snapshot.inspections.is_empty());
        assert!(snapshot.pending_sync.is_empty());
    }

    #[test]
    fn corrupt_json_is_reported() {
        for input in ["{not json", "null", "[1, 2]", r#"{"inspections": "oops"}"#] {
            let result = Snapshot::from_json(input);
            assert!(
                matches!(result, Err(Error::CorruptState(_))),
                "accepted: {}",
                input
            );
        }
    }

    #[test]
    fn bad_timestamp_is_corrupt() {
        let result = Snapshot::from_json(r#"{"inspections": [], "lastSync": "yesterday"}"#);
        assert!(matches!(result, Err(Error::CorruptState(_))));
    }
}
