//! Error types for the fieldcheck engine.

use thiserror::Error;

/// All possible errors from the fieldcheck engine.
///
/// Both sync-facing kinds are recovered where they originate: a rejected
/// sync leaves every piece of state untouched, and a corrupt snapshot makes
/// the session fall back to its default record set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cannot sync while offline; changes will be synced when connection is restored")]
    OfflineSyncRejected,

    #[error("corrupt persisted state: {0}")]
    CorruptState(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
