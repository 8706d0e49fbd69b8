//! Local key-value storage and the persistence adapter on top of it.
//!
//! The engine does no IO of its own. Hosts hand the session something that
//! implements [`KeyValueStorage`]; [`MemoryStorage`] is provided for tests
//! and embedding.

use crate::{error::Result, Snapshot};
use std::collections::HashMap;

/// Key the session snapshot is stored under.
pub const STORAGE_KEY: &str = "inspectionData";

/// Minimal string key-value store.
pub trait KeyValueStorage {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing whatever was there.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one raw value.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.into(), value.into());
        storage
    }

    /// Raw stored value, bypassing the trait's error type.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes whole snapshots under a single key.
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStorage> Persistence<S> {
    /// Adapter over `storage` using [`STORAGE_KEY`].
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Overwrite the stored snapshot.
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        self.storage.set(&self.key, &json)
    }

    /// Read the stored snapshot.
    ///
    /// `Ok(None)` if nothing was ever saved; `Err(CorruptState)` if the
    /// stored value does not parse.
    pub fn load(&self) -> Result<Option<Snapshot>> {
        match self.storage.get(&self.key)? {
            Some(json) => Snapshot::from_json(&json).map(Some),
            None => Ok(None),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_inner(self) -> S {
        self.storage
    }
}
