use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use super::{KeyValueStore, RecordStore, StorageError};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory KeyValueStore for tests. Clones share the same map.
///
/// Reads, writes and removes can be made to fail so callers' fallback paths
/// can be exercised.
#[derive(Clone, Debug, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    failing_keys: Arc<Mutex<HashSet<String>>>,
    fail_removes: Arc<AtomicBool>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Fails every `set`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Fails `set` for `key` only; other keys still write.
    pub fn fail_writes_to(&self, key: &str) {
        lock(&self.failing_keys).insert(key.to_string());
    }

    pub fn fail_removes(&self, fail: bool) {
        self.fail_removes.store(fail, Ordering::SeqCst);
    }

    /// Direct peek that ignores failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read failed".to_string()));
        }
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) || lock(&self.failing_keys).contains(key) {
            return Err(StorageError::Unavailable(format!("write to '{key}' failed")));
        }
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("remove failed".to_string()));
        }
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// In-memory RecordStore for tests. Behaves like a fresh local database:
/// reads and writes fail until `open` has created the store.
#[derive(Clone, Debug)]
pub struct MemoryRecordStore<T> {
    name: String,
    opened: Arc<AtomicBool>,
    records: Arc<Mutex<HashMap<u32, T>>>,
    fail_writes: Arc<AtomicBool>,
}

impl<T> MemoryRecordStore<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            opened: Arc::new(AtomicBool::new(false)),
            records: Arc::new(Mutex::new(HashMap::new())),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StorageError::MissingStore(self.name.clone()))
        }
    }
}

#[async_trait]
impl<T> RecordStore<T> for MemoryRecordStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn open(&self) -> Result<(), StorageError> {
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn get(&self, id: u32) -> Result<Option<T>, StorageError> {
        self.ensure_open()?;
        Ok(lock(&self.records).get(&id).cloned())
    }

    async fn put(&self, id: u32, record: T) -> Result<(), StorageError> {
        self.ensure_open()?;
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("write failed".to_string()));
        }
        lock(&self.records).insert(id, record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kv_set_get_remove() {
        let kv = MemoryKeyValueStore::new();
        kv.set("authToken", "abc").unwrap();
        assert_eq!(kv.get("authToken").unwrap().as_deref(), Some("abc"));
        kv.remove("authToken").unwrap();
        assert!(kv.get("authToken").unwrap().is_none());
        assert!(kv.is_empty());
    }

    #[test]
    fn test_kv_clones_share_state() {
        let kv = MemoryKeyValueStore::new();
        let other = kv.clone();
        kv.set("k", "v").unwrap();
        assert_eq!(other.raw("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_kv_failure_injection() {
        let kv = MemoryKeyValueStore::new();
        kv.set("k", "v").unwrap();
        kv.fail_reads(true);
        kv.fail_removes(true);
        assert!(kv.get("k").is_err());
        assert!(kv.remove("k").is_err());
        assert_eq!(kv.raw("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_kv_write_failure_leaves_value() {
        let kv = MemoryKeyValueStore::new();
        kv.set("a", "1").unwrap();
        kv.set("b", "1").unwrap();

        kv.fail_writes_to("a");
        assert!(kv.set("a", "2").is_err());
        kv.set("b", "2").unwrap();
        assert_eq!(kv.raw("a").as_deref(), Some("1"));

        kv.fail_writes(true);
        assert!(kv.set("b", "3").is_err());
        assert_eq!(kv.raw("b").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_record_store_requires_open() {
        let store: MemoryRecordStore<String> = MemoryRecordStore::new("users");
        assert!(matches!(
            store.get(1).await,
            Err(StorageError::MissingStore(name)) if name == "users"
        ));

        store.open().await.unwrap();
        assert!(store.get(1).await.unwrap().is_none());
        store.put(1, "first".to_string()).await.unwrap();
        store.put(1, "second".to_string()).await.unwrap();
        assert_eq!(store.get(1).await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_record_store_write_failure_keeps_old_record() {
        let store: MemoryRecordStore<String> = MemoryRecordStore::new("users");
        store.open().await.unwrap();
        store.put(1, "kept".to_string()).await.unwrap();
        store.fail_writes(true);
        assert!(store.put(1, "lost".to_string()).await.is_err());
        assert_eq!(store.get(1).await.unwrap().as_deref(), Some("kept"));
    }
}
