//! Inspection records.

use crate::{clock, RecordId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};

/// Progress of an inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InspectionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

/// Leak detection result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeakLevel {
    #[default]
    None,
    Minor,
    Major,
    Critical,
}

/// Inspector name pre-filled on new drafts.
pub const DRAFT_INSPECTOR: &str = "Current User";

/// A single field inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inspection {
    /// Assigned at creation, never changes
    pub id: RecordId,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub inspector: String,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub status: InspectionStatus,
    /// Pressure reading in PSI
    #[serde(
        default,
        deserialize_with = "lenient_reading",
        skip_serializing_if = "Option::is_none"
    )]
    pub pressure: Option<f64>,
    /// Temperature reading in °F
    #[serde(
        default,
        deserialize_with = "lenient_reading",
        skip_serializing_if = "Option::is_none"
    )]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub leaks: LeakLevel,
    #[serde(default)]
    pub notes: String,
    /// Whether the remote has acknowledged the latest local state
    #[serde(default)]
    pub synced: bool,
}

impl Inspection {
    /// Create an inspection with the identifying fields set and everything
    /// else left at its default.
    pub fn new(
        id: RecordId,
        site: impl Into<String>,
        inspector: impl Into<String>,
        date: impl Into<String>,
        status: InspectionStatus,
    ) -> Self {
        Self {
            id,
            site: site.into(),
            inspector: inspector.into(),
            date: date.into(),
            status,
            pressure: None,
            temperature: None,
            leaks: LeakLevel::None,
            notes: String::new(),
            synced: false,
        }
    }

    /// A blank inspection as the entry form presents it.
    pub fn draft(id: RecordId, now: Timestamp) -> Self {
        Self::new(
            id,
            "",
            DRAFT_INSPECTOR,
            clock::date_string(now),
            InspectionStatus::Pending,
        )
    }

    /// Completed inspections are read-only in the presentation layer.
    pub fn is_locked(&self) -> bool {
        self.status == InspectionStatus::Completed
    }

    pub fn with_readings(mut self, pressure: Option<f64>, temperature: Option<f64>) -> Self {
        self.pressure = pressure;
        self.temperature = temperature;
        self
    }

    pub fn with_leaks(mut self, leaks: LeakLevel) -> Self {
        self.leaks = leaks;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_synced(mut self, synced: bool) -> Self {
        self.synced = synced;
        self
    }
}

/// The record set a session starts with when nothing has been persisted.
pub fn default_inspections() -> Vec<Inspection> {
    vec![
        Inspection::new(
            1,
            "Well Pad A-12",
            "John Smith",
            "2025-11-18",
            InspectionStatus::Completed,
        )
        .with_synced(true),
        Inspection::new(
            2,
            "Pipeline Segment B-45",
            "Sarah Johnson",
            "2025-11-19",
            InspectionStatus::InProgress,
        )
        .with_synced(true),
        Inspection::new(
            3,
            "Storage Tank C-7",
            "Mike Davis",
            "2025-11-19",
            InspectionStatus::Pending,
        )
        .with_synced(true),
    ]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReading {
    Number(f64),
    Text(String),
}

/// Readings arrive either as numbers or as raw form input. Blank or
/// unparseable text means "not measured".
fn lenient_reading<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawReading>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawReading::Number(n)) => Some(n),
        Some(RawReading::Text(text)) => text.trim().parse::<f64>().ok(),
        None => None,
    }
    .filter(|n| n.is_finite()))
}
