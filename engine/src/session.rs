//! Session - the single owner of all inspection state.
//!
//! A session holds the record store, the pending-sync set, the connectivity
//! flag, the last-sync time, the notification feed and the scheduler. Every
//! mutation of the store, the pending set or the last-sync time is followed
//! by a synchronous write of the whole snapshot.
//!
//! Operations take the current time explicitly. Nothing here sleeps or
//! reads the wall clock; delayed work is queued on the scheduler and run by
//! [`Session::advance`].

use crate::{
    clock,
    error::Result,
    notification::{roll_simulated_event, NotificationFeed},
    scheduler::{Scheduler, Task},
    storage::{KeyValueStorage, Persistence},
    store::Upsert,
    sync::{self, InFlightSync, SyncReport, SyncRequest, SyncTicket},
    default_inspections, Error, Inspection, Notification, NotificationId, NotificationKind,
    PendingSync, RecordId, RecordStore, SessionConfig, Snapshot, Timestamp,
};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

pub const SAVED_ONLINE_MESSAGE: &str = "Inspection saved and synced";
pub const SAVED_OFFLINE_MESSAGE: &str = "Saved locally. Will sync when online.";

/// Where the session's initial state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupSource {
    /// A stored snapshot was loaded
    Restored,
    /// Nothing was stored; defaults were used
    Defaults,
    /// The stored snapshot was unreadable; defaults were used
    RecoveredFromCorruption,
}

/// Result of a save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub id: RecordId,
    /// True if the id was new to the store
    pub created: bool,
    /// The `synced` flag the record was stored with
    pub synced: bool,
    pub notification: Notification,
}

/// Result of a connectivity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityChange {
    pub online: bool,
    /// False if the flag already had this value
    pub changed: bool,
    /// When an automatic sync was scheduled, if one was
    pub auto_sync_at: Option<Timestamp>,
    /// Ticket of an in-flight sync dropped by going offline
    pub cancelled_sync: Option<SyncTicket>,
}

/// Everything that happened during one [`Session::advance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advance {
    /// Notifications added, oldest first
    pub notifications: Vec<Notification>,
    /// Syncs started by the automatic reconnect sync
    pub started_syncs: Vec<SyncTicket>,
    pub completed_syncs: Vec<SyncReport>,
}

impl Advance {
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
            && self.started_syncs.is_empty()
            && self.completed_syncs.is_empty()
    }
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub inspections: Vec<Inspection>,
    pub pending_sync: Vec<RecordId>,
    pub is_online: bool,
    pub last_sync: DateTime<Utc>,
    pub notifications: Vec<Notification>,
    pub sync_in_flight: bool,
}

/// The application's single mutable session.
#[derive(Debug)]
pub struct Session<S> {
    config: SessionConfig,
    store: RecordStore,
    pending: PendingSync,
    online: bool,
    last_sync: Timestamp,
    feed: NotificationFeed,
    scheduler: Scheduler,
    in_flight: Option<InFlightSync>,
    next_ticket: SyncTicket,
    source: StartupSource,
    persistence: Persistence<S>,
}

impl<S: KeyValueStorage> Session<S> {
    /// Open a session over `storage`.
    ///
    /// The stored snapshot is read exactly once. When it is missing or
    /// corrupt the default record set is used with an empty pending set.
    /// A storage failure is returned as is and nothing is written back.
    pub fn open(storage: S, config: SessionConfig, now: Timestamp) -> Result<Self> {
        let persistence = Persistence::new(storage);

        let (snapshot, source) = match persistence.load() {
            Ok(Some(snapshot)) => (snapshot, StartupSource::Restored),
            Ok(None) => (
                Snapshot::new(default_inspections(), Vec::new(), None),
                StartupSource::Defaults,
            ),
            Err(e @ Error::CorruptState(_)) => {
                tracing::warn!(error = %e, "stored state unreadable; starting from defaults");
                (
                    Snapshot::new(default_inspections(), Vec::new(), None),
                    StartupSource::RecoveredFromCorruption,
                )
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read stored state");
                return Err(e);
            }
        };

        let mut session = Self {
            feed: NotificationFeed::new(config.feed_capacity),
            online: config.start_online,
            store: RecordStore::new(),
            pending: PendingSync::new(),
            last_sync: now,
            scheduler: Scheduler::new(),
            in_flight: None,
            next_ticket: 0,
            source,
            persistence,
            config,
        };
        session.restore(snapshot, now);

        if session.config.event_interval_ms > 0 {
            session.scheduler.schedule(
                now.saturating_add(session.config.event_interval_ms),
                Task::SimulatedEvent,
            );
        }

        tracing::info!(
            source = ?session.source,
            records = session.store.len(),
            pending = session.pending.len(),
            online = session.online,
            "session opened"
        );

        session.persist();
        Ok(session)
    }

    /// Seed in-memory state from a snapshot, repairing what would break the
    /// store and pending-set invariants.
    fn restore(&mut self, snapshot: Snapshot, now: Timestamp) {
        let loaded = snapshot.inspections.len();
        self.store = RecordStore::from_records(snapshot.inspections);
        if self.store.len() != loaded {
            tracing::warn!(
                loaded,
                kept = self.store.len(),
                "duplicate record ids collapsed"
            );
        }

        self.pending = PendingSync::new();
        for id in snapshot.pending_sync {
            match self.store.get(id) {
                Some(record) => {
                    if record.synced {
                        tracing::debug!(record_id = id, "pending record claimed synced; reset");
                        self.store.set_synced(id, false);
                    }
                    self.pending.mark_pending(id);
                }
                None => tracing::warn!(record_id = id, "pending id without record dropped"),
            }
        }

        self.last_sync = snapshot.last_sync.map(clock::from_datetime).unwrap_or(now);
    }

    /// Write the current state, reporting a failure instead of logging it.
    pub fn flush(&mut self) -> Result<()> {
        let snapshot = self.snapshot();
        self.persistence.save(&snapshot)
    }

    /// Final write before the session goes away. Returns the storage.
    pub fn close(mut self) -> Result<S> {
        self.flush()?;
        tracing::info!(records = self.store.len(), pending = self.pending.len(), "session closed");
        Ok(self.persistence.into_inner())
    }

    /// Save a new or edited inspection.
    ///
    /// Online saves count as immediately synced. Offline saves are stored
    /// unsynced and join the pending set. Never fails; the record is not
    /// validated.
    pub fn save_inspection(&mut self, mut inspection: Inspection, now: Timestamp) -> SaveOutcome {
        let id = inspection.id;
        inspection.synced = self.online;
        let created = self.store.upsert(inspection) == Upsert::Inserted;

        let notification = if self.online {
            // Acknowledged directly; an older offline edit no longer needs a sync
            self.pending.remove(id);
            self.feed.push(NotificationKind::Success, SAVED_ONLINE_MESSAGE, now)
        } else {
            self.pending.mark_pending(id);
            self.feed.push(NotificationKind::Warning, SAVED_OFFLINE_MESSAGE, now)
        };

        tracing::debug!(record_id = id, created, online = self.online, "inspection saved");
        self.persist();

        SaveOutcome {
            id,
            created,
            synced: self.online,
            notification,
        }
    }

    /// Ask for a sync of everything currently pending.
    ///
    /// Fails with [`Error::OfflineSyncRejected`] while offline, changing
    /// nothing. While another sync is in flight the request is ignored.
    /// With nothing pending it is a no-op: no timestamp change and no
    /// notification.
    pub fn request_sync(&mut self, now: Timestamp) -> Result<SyncRequest> {
        if !self.online {
            tracing::info!("sync refused while offline");
            return Err(Error::OfflineSyncRejected);
        }

        if let Some(flight) = &self.in_flight {
            tracing::debug!(ticket = flight.ticket, "sync already in flight");
            return Ok(SyncRequest::AlreadyInFlight {
                ticket: flight.ticket,
            });
        }

        if self.pending.is_empty() {
            return Ok(SyncRequest::NothingToSync);
        }

        self.next_ticket += 1;
        let flight = InFlightSync::new(
            self.next_ticket,
            now,
            self.config.sync_latency_ms,
            self.pending.snapshot(),
        );
        let count = flight.entries.len();
        let completes_at = flight.completes_at;
        let ticket = flight.ticket;

        self.scheduler
            .schedule(completes_at, Task::CompleteSync { ticket });
        self.in_flight = Some(flight);

        tracing::info!(ticket, count, completes_at, "sync started");

        Ok(SyncRequest::Started {
            ticket,
            count,
            completes_at: clock::to_datetime(completes_at),
        })
    }

    /// Set the connectivity flag from an environment signal.
    pub fn set_online(&mut self, online: bool, now: Timestamp) -> ConnectivityChange {
        if online == self.online {
            return ConnectivityChange {
                online,
                changed: false,
                auto_sync_at: None,
                cancelled_sync: None,
            };
        }
        self.online = online;

        let mut change = ConnectivityChange {
            online,
            changed: true,
            auto_sync_at: None,
            cancelled_sync: None,
        };

        if online {
            if !self.pending.is_empty() && !self.scheduler.has(|t| *t == Task::AutoSync) {
                let due = now.saturating_add(self.config.auto_sync_delay_ms);
                self.scheduler.schedule(due, Task::AutoSync);
                change.auto_sync_at = Some(due);
            }
        } else {
            self.scheduler.cancel(|t| *t == Task::AutoSync);
            if self.config.cancel_sync_on_offline {
                if let Some(flight) = self.in_flight.take() {
                    self.scheduler.cancel(
                        |t| matches!(t, Task::CompleteSync { ticket } if *ticket == flight.ticket),
                    );
                    tracing::info!(ticket = flight.ticket, "in-flight sync cancelled by going offline");
                    change.cancelled_sync = Some(flight.ticket);
                }
            }
        }

        tracing::info!(online, pending = self.pending.len(), "connectivity changed");
        change
    }

    /// Flip the connectivity flag.
    pub fn toggle_online(&mut self, now: Timestamp) -> ConnectivityChange {
        self.set_online(!self.online, now)
    }

    /// Run every scheduled task due at or before `now`, in due order.
    ///
    /// Each task runs at its own due time, so the outcome does not depend on
    /// how late the host calls in.
    pub fn advance<R: Rng + ?Sized>(&mut self, now: Timestamp, rng: &mut R) -> Advance {
        let mut advance = Advance::default();

        while let Some((due, task)) = self.scheduler.pop_due(now) {
            match task {
                Task::CompleteSync { ticket } => {
                    if let Some((report, notification)) = self.complete_sync(ticket, due) {
                        advance.notifications.push(notification);
                        advance.completed_syncs.push(report);
                    }
                }
                Task::AutoSync => {
                    if self.online && !self.pending.is_empty() {
                        if let Ok(SyncRequest::Started { ticket, .. }) = self.request_sync(due) {
                            advance.started_syncs.push(ticket);
                        }
                    }
                }
                Task::SimulatedEvent => {
                    self.scheduler.schedule(
                        due.saturating_add(self.config.event_interval_ms),
                        Task::SimulatedEvent,
                    );
                    if self.online {
                        if let Some((kind, message)) =
                            roll_simulated_event(rng, self.config.event_probability)
                        {
                            advance.notifications.push(self.feed.push(kind, message, due));
                        }
                    }
                }
            }
        }

        advance
    }

    fn complete_sync(
        &mut self,
        ticket: SyncTicket,
        now: Timestamp,
    ) -> Option<(SyncReport, Notification)> {
        let flight = match self.in_flight.take() {
            Some(flight) if flight.ticket == ticket => flight,
            other => {
                // Stale completion for a cancelled sync
                self.in_flight = other;
                return None;
            }
        };

        let report = sync::complete(&mut self.store, &mut self.pending, &flight, now);
        self.last_sync = now;
        let notification = self.feed.push(
            NotificationKind::Success,
            format!("Successfully synced {} inspection(s)", report.synced.len()),
            now,
        );

        tracing::info!(
            ticket,
            synced = report.synced.len(),
            superseded = report.superseded.len(),
            "sync completed"
        );
        self.persist();
        Some((report, notification))
    }

    /// Earliest time [`Session::advance`] has work to do.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.scheduler.next_due()
    }

    /// A blank inspection with an id no stored record uses.
    pub fn new_draft(&self, now: Timestamp) -> Inspection {
        if !self.store.contains(now) {
            return Inspection::draft(now, now);
        }
        let id = self
            .store
            .max_id()
            .and_then(|max| max.checked_add(1))
            .unwrap_or_else(|| {
                // The maximum id is taken; probe upward from `now`, wrapping
                (now..=RecordId::MAX)
                    .chain(0..now)
                    .find(|id| !self.store.contains(*id))
                    .unwrap_or(now)
            });
        Inspection::draft(id, now)
    }

    /// False for stored records that are completed.
    pub fn is_editable(&self, id: RecordId) -> bool {
        self.store.get(id).map_or(true, |r| !r.is_locked())
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        self.feed.dismiss(id)
    }

    pub fn clear_notifications(&mut self) {
        self.feed.clear();
    }

    pub fn inspections(&self) -> &[Inspection] {
        self.store.all()
    }

    pub fn get(&self, id: RecordId) -> Option<&Inspection> {
        self.store.get(id)
    }

    pub fn pending_ids(&self) -> Vec<RecordId> {
        self.pending.ids()
    }

    pub fn is_pending(&self, id: RecordId) -> bool {
        self.pending.contains(id)
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn last_sync(&self) -> DateTime<Utc> {
        clock::to_datetime(self.last_sync)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.feed.list()
    }

    pub fn in_flight(&self) -> Option<&InFlightSync> {
        self.in_flight.as_ref()
    }

    pub fn source(&self) -> StartupSource {
        self.source
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        self.persistence.storage()
    }

    /// What would be persisted right now.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.store.all().to_vec(),
            self.pending.ids(),
            Some(clock::to_datetime(self.last_sync)),
        )
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            inspections: self.store.all().to_vec(),
            pending_sync: self.pending.ids(),
            is_online: self.online,
            last_sync: self.last_sync(),
            notifications: self.feed.list(),
            sync_in_flight: self.in_flight.is_some(),
        }
    }

    /// Write the snapshot. A failed write leaves memory authoritative; the
    /// next mutation writes the full state again.
    fn persist(&mut self) {
        let snapshot = self.snapshot();
        if let Err(e) = self.persistence.save(&snapshot) {
            tracing::warn!(error = %e, "failed to persist session state");
        }
    }
}
