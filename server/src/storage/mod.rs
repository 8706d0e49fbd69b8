//! Storage backends for the session snapshot.

mod file;

pub use file::FileStorage;

use fieldcheck_engine::KeyValueStorage;

/// Storage type the shared session is opened over.
pub type BoxedStorage = Box<dyn KeyValueStorage + Send>;
