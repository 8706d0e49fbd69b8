//! # Fieldcheck Engine
//!
//! A deterministic, offline-first store for field inspection records.
//!
//! Inspectors keep working while disconnected. Every save lands in a local
//! record store; saves made offline join a pending-sync set that is flushed
//! by a (simulated) sync once connectivity returns. The whole state is
//! persisted as one JSON snapshot after each change.
//!
//! ## Design Principles
//!
//! - **Explicit time**: every operation takes `now` in Unix milliseconds
//! - **Deterministic**: delayed work runs off a scheduler the host drives
//! - **Pluggable storage**: persistence goes through [`KeyValueStorage`]
//! - **No IO**: the engine never touches files, sockets or the wall clock
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! An [`Inspection`] is keyed by a numeric id. The [`RecordStore`] keeps
//! records in insertion order; saving an existing id replaces it in place.
//!
//! ### Pending Sync
//!
//! [`PendingSync`] tracks ids saved while offline. Each entry carries a
//! revision so a sync only acknowledges the edits it actually captured.
//!
//! ### Session
//!
//! [`Session`] owns everything: store, pending set, connectivity flag,
//! last-sync time, [`NotificationFeed`] and [`Scheduler`]. Hosts call
//! [`Session::advance`] when [`Session::next_due`] is reached.
//!
//! ## Quick Start
//!
//! ```rust
//! use fieldcheck_engine::{
//!     Inspection, InspectionStatus, MemoryStorage, Session, SessionConfig, SyncRequest,
//! };
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let now = 1_763_546_400_000;
//! let mut session = Session::open(MemoryStorage::new(), SessionConfig::default(), now).unwrap();
//!
//! // Offline saves queue up
//! session.set_online(false, now);
//! let record = Inspection::new(10, "Compressor D-3", "Current User", "2025-11-19",
//!     InspectionStatus::InProgress);
//! session.save_inspection(record, now);
//! assert_eq!(session.pending_ids(), vec![10]);
//!
//! // Back online: sync, then let the simulated round trip finish
//! session.set_online(true, now + 10);
//! let request = session.request_sync(now + 20).unwrap();
//! assert!(matches!(request, SyncRequest::Started { count: 1, .. }));
//!
//! let mut rng = StdRng::seed_from_u64(1);
//! let advance = session.advance(now + 1520, &mut rng);
//! assert_eq!(advance.completed_syncs.len(), 1);
//! assert!(session.pending_ids().is_empty());
//! ```
//!
//! ## Persistence
//!
//! The snapshot lives under [`STORAGE_KEY`] as
//! `{"inspections": [...], "pendingSync": [...], "lastSync": "..."}`.

pub mod clock;
pub mod config;
pub mod error;
pub mod inspection;
pub mod notification;
pub mod pending;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod sync;

// Re-export main types at crate root
pub use config::SessionConfig;
pub use error::{Error, Result};
pub use inspection::{default_inspections, Inspection, InspectionStatus, LeakLevel};
pub use notification::{Notification, NotificationFeed, NotificationKind};
pub use pending::PendingSync;
pub use scheduler::{Scheduler, Task};
pub use session::{Advance, ConnectivityChange, SaveOutcome, Session, SessionView, StartupSource};
pub use snapshot::Snapshot;
pub use storage::{KeyValueStorage, MemoryStorage, Persistence, STORAGE_KEY};
pub use store::{RecordStore, Upsert};
pub use sync::{SyncReport, SyncRequest, SyncTicket};

/// Type aliases for clarity
pub type RecordId = u64;
pub type Timestamp = u64;
pub type NotificationId = u64;
