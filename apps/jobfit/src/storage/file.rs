//! # Filesystem-backed stores
//!
//! Native stand-ins for browser storage, used by the `jobfit` binary.
//!
//! ```text
//! <data_dir>/
//! ├── local_storage.json        # FileKeyValueStore: one JSON object of string values
//! └── <db_name>/
//!     └── <store_name>/
//!         └── <id>.json         # FileRecordStore: one file per record
//! ```
//!
//! Every write goes to a sibling `.tmp` file which is then renamed over the
//! target, so a reader never sees a half-written value.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::{KeyValueStore, RecordStore, StorageError};

const LOCAL_STORAGE_FILE: &str = "local_storage.json";

/// KeyValueStore persisted as a single JSON map.
#[derive(Clone, Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    /// Store rooted at `<dir>/local_storage.json`.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(LOCAL_STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// RecordStore persisted as one JSON file per record.
#[derive(Clone, Debug)]
pub struct FileRecordStore<T> {
    dir: PathBuf,
    name: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> FileRecordStore<T> {
    /// Store `<data_dir>/<db_name>/<store_name>/`.
    pub fn new(data_dir: &Path, db_name: &str, store_name: &str) -> Self {
        Self {
            dir: data_dir.join(db_name).join(store_name),
            name: format!("{db_name}/{store_name}"),
            _record: PhantomData,
        }
    }

    fn record_path(&self, id: u32) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    async fn ensure_open(&self) -> Result<(), StorageError> {
        match tokio::fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StorageError::MissingStore(self.name.clone())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::MissingStore(self.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for FileRecordStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn open(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    async fn get(&self, id: u32) -> Result<Option<T>, StorageError> {
        self.ensure_open().await?;
        match tokio::fs::read(self.record_path(id)).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, id: u32, record: T) -> Result<(), StorageError> {
        self.ensure_open().await?;
        let path = self.record_path(id);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec(&record)?).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}
