//! Session configuration.

use crate::notification::DEFAULT_FEED_CAPACITY;
use serde::{Deserialize, Serialize};

/// Timing and behavior knobs for a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Simulated round trip of a sync
    pub sync_latency_ms: u64,
    /// Delay between reconnecting and the automatic sync
    pub auto_sync_delay_ms: u64,
    /// Period of the simulated server-push generator; 0 disables it
    pub event_interval_ms: u64,
    /// Chance that a generator tick produces a notification
    pub event_probability: f64,
    /// Maximum notifications kept in the feed
    pub feed_capacity: usize,
    /// Drop an in-flight sync when connectivity is lost
    pub cancel_sync_on_offline: bool,
    /// Connectivity at session start
    pub start_online: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sync_latency_ms: 1500,
            auto_sync_delay_ms: 1000,
            event_interval_ms: 15_000,
            event_probability: 0.3,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            cancel_sync_on_offline: true,
            start_online: true,
        }
    }
}
