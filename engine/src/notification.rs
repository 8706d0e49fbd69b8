//! Notification feed.
//!
//! A bounded, most-recent-first list of event messages. The feed is purely
//! observational: nothing in the reconciliation logic reads it back.

use crate::{clock, NotificationId, Timestamp};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of notifications kept.
pub const DEFAULT_FEED_CAPACITY: usize = 10;

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Update,
    Alert,
    Sync,
    Success,
    Warning,
}

/// A single feed entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded feed, newest entry first.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    items: VecDeque<Notification>,
    capacity: usize,
    next_id: NotificationId,
}

impl NotificationFeed {
    /// Create a feed holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 0,
        }
    }

    /// Insert at the head, dropping the oldest entries past capacity.
    pub fn push(
        &mut self,
        kind: NotificationKind,
        message: impl Into<String>,
        now: Timestamp,
    ) -> Notification {
        self.next_id += 1;
        let notification = Notification {
            id: self.next_id,
            kind,
            message: message.into(),
            timestamp: clock::to_datetime(now),
        };
        self.items.push_front(notification.clone());
        self.items.truncate(self.capacity);
        notification
    }

    /// Entries, most recent first.
    pub fn list(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    /// Remove one entry. Returns false if it was not in the feed.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for NotificationFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

/// Canned server pushes the simulated event generator picks from.
pub const SIMULATED_EVENTS: [(NotificationKind, &str); 3] = [
    (
        NotificationKind::Update,
        "Inspection data updated for Well Pad A-12",
    ),
    (
        NotificationKind::Alert,
        "Safety alert: High pressure detected at Pipeline B-45",
    ),
    (NotificationKind::Sync, "New inspection protocols available"),
];

/// Decide whether a simulated server push fires on this tick, and which.
///
/// `probability` is clamped to `[0, 1]`.
pub fn roll_simulated_event<R: Rng + ?Sized>(
    rng: &mut R,
    probability: f64,
) -> Option<(NotificationKind, &'static str)> {
    let p = if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    };
    if !rng.gen_bool(p) {
        return None;
    }
    Some(SIMULATED_EVENTS[rng.gen_range(0..SIMULATED_EVENTS.len())])
}
