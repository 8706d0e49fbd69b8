//! Conversions between engine timestamps and calendar time.
//!
//! The engine never reads the wall clock. Every operation takes `now` as a
//! [`Timestamp`] (milliseconds since the Unix epoch) so that tests can drive
//! simulated time by hand. Calendar types only appear at the edges: the
//! persisted `lastSync` field, notification times and draft dates.

use crate::Timestamp;
use chrono::{DateTime, Utc};

/// Convert milliseconds since the epoch into a UTC datetime.
///
/// Values beyond chrono's representable range saturate to the epoch.
pub fn to_datetime(ts: Timestamp) -> DateTime<Utc> {
    i64::try_from(ts)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

/// Convert a UTC datetime into milliseconds since the epoch.
///
/// Datetimes before the epoch clamp to zero.
pub fn from_datetime(dt: DateTime<Utc>) -> Timestamp {
    u64::try_from(dt.timestamp_millis()).unwrap_or(0)
}

/// Calendar date of a timestamp in `YYYY-MM-DD` form.
pub fn date_string(ts: Timestamp) -> String {
    to_datetime(ts).format("%Y-%m-%d").to_string()
}
