//! Simulated-time task queue.
//!
//! The session never sleeps. Delayed work (sync latency, auto-sync after
//! reconnecting, the periodic server-push generator) is queued here with a
//! due time, and the host drains it by calling `Session::advance` with the
//! current time. Tests advance time by hand.

use crate::{sync::SyncTicket, Timestamp};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Finish the in-flight sync with this ticket
    CompleteSync { ticket: SyncTicket },
    /// Start a sync after coming back online
    AutoSync,
    /// Periodic simulated server push
    SimulatedEvent,
}

#[derive(Debug, Clone)]
struct Entry {
    due: Timestamp,
    seq: u64,
    task: Task,
}

// Ordered by (due, seq) only; tasks scheduled for the same instant run in
// the order they were scheduled.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

/// Min-queue of tasks keyed by due time.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a task to run at `due`.
    pub fn schedule(&mut self, due: Timestamp, task: Task) {
        self.next_seq += 1;
        self.queue.push(Reverse(Entry {
            due,
            seq: self.next_seq,
            task,
        }));
    }

    /// Earliest due time, if anything is queued.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.queue.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pop the earliest task if it is due at or before `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(Timestamp, Task)> {
        if self.next_due()? > now {
            return None;
        }
        self.queue
            .pop()
            .map(|Reverse(entry)| (entry.due, entry.task))
    }

    /// Drop every queued task matching the predicate. Returns how many
    /// were removed.
    pub fn cancel(&mut self, mut predicate: impl FnMut(&Task) -> bool) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(entry)| !predicate(&entry.task));
        before - self.queue.len()
    }

    /// Whether any queued task matches the predicate.
    pub fn has(&self, mut predicate: impl FnMut(&Task) -> bool) -> bool {
        self.queue.iter().any(|Reverse(entry)| predicate(&entry.task))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
