//! Storage seams for client-side persistence.
//!
//! Two small interfaces stand in for the browser's storage APIs:
//!
//! | Trait | Models | Used by |
//! |-------|--------|---------|
//! | [`KeyValueStore`] | durable string key/value storage (`localStorage`) | [`crate::session::SessionStore`] |
//! | [`RecordStore`] | a keyed record store inside a local database (IndexedDB) | [`crate::profile::ProfileCache`] |
//!
//! Each has an in-memory implementation for tests ([`memory`]) and a
//! file-backed implementation for the native binary ([`file`]).

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::{FileKeyValueStore, FileRecordStore};
pub use memory::{MemoryKeyValueStore, MemoryRecordStore};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Record store '{0}' does not exist; open it first")]
    MissingStore(String),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string key/value storage. Synchronous, like the browser API it replaces.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// A record store keyed by integer id. `put` replaces the whole record.
#[async_trait]
pub trait RecordStore<T>: Send + Sync
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Creates the store's schema if it is absent. Safe to call repeatedly.
    async fn open(&self) -> Result<(), StorageError>;

    async fn get(&self, id: u32) -> Result<Option<T>, StorageError>;

    async fn put(&self, id: u32, record: T) -> Result<(), StorageError>;
}
