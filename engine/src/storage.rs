//! Persistence adapter between the inventory and a durable key-value store.
//!
//! The engine does not know where data lives. A host hands it something that
//! implements [`KeyValueStore`]; [`ProductStorage`] reads and writes the
//! product collection under [`STORAGE_KEY`](crate::snapshot::STORAGE_KEY).
//!
//! Loading and saving are best effort. [`ProductStorage::load`] turns a
//! missing or corrupt record into an empty collection and
//! [`ProductStorage::save`] logs write failures instead of returning them.
//! Callers that need the error use the `try_` variants.

use crate::{error::Result, snapshot, Error, Product};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A durable string-to-string store owned by the host.
pub trait KeyValueStore {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Deleting a missing key succeeds.
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!("read '{key}': {e}"))),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = self.path_for(key);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|e| Error::Storage(format!("write '{key}': {e}")))?;
        fs::rename(&tmp, &target).map_err(|e| Error::Storage(format!("rename '{key}': {e}")))?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Storage(format!("remove '{key}': {e}"))),
        }
    }
}

/// Reads and writes the product collection through a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct ProductStorage<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> ProductStorage<K> {
    /// Storage under the standard key.
    pub fn new(store: K) -> Self {
        Self::with_key(store, snapshot::STORAGE_KEY)
    }

    /// Storage under a custom key.
    pub fn with_key(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }

    pub fn into_inner(self) -> K {
        self.store
    }

    /// Load the collection, or an empty one if nothing usable is stored.
    pub fn load(&self) -> Vec<Product> {
        match self.try_load() {
            Ok(products) => {
                info!(key = %self.key, count = products.len(), "Loaded products");
                products
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable product data");
                Vec::new()
            }
        }
    }

    /// Load the collection, reporting corrupt data as an error.
    pub fn try_load(&self) -> Result<Vec<Product>> {
        match self.store.get(&self.key)? {
            Some(json) => snapshot::from_json(&json),
            None => {
                debug!(key = %self.key, "No stored products");
                Ok(Vec::new())
            }
        }
    }

    /// Persist the collection, logging and swallowing failures.
    pub fn save(&mut self, products: &[Product]) {
        if let Err(e) = self.try_save(products) {
            warn!(key = %self.key, error = %e, "Failed to save products");
        }
    }

    /// Persist the collection, returning failures.
    pub fn try_save(&mut self, products: &[Product]) -> Result<()> {
        let json = snapshot::to_json(products)?;
        self.store.set(&self.key, &json)?;
        debug!(key = %self.key, count = products.len(), "Saved products");
        Ok(())
    }

    /// Remove the stored collection.
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(&self.key)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ProductInput;
    use chrono::{TimeZone, Utc};

    /// Store whose writes always fail.
    #[derive(Debug, Default)]
    pub(crate) struct FailingStore {
        pub(crate) attempts: usize,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            self.attempts += 1;
            Err(Error::Storage("quota exceeded".into()))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Ok(())
        }
    }

    fn products() -> Vec<Product> {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        vec![
            ProductInput::new(1, "Widget", 5).into_product(ts),
            ProductInput::new(2, "Gadget", 0).into_product(ts),
        ]
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("vitrina-storage-{}-{name}", std::process::id()))
    }

    #[test]
    fn missing_record_loads_empty() {
        let storage = ProductStorage::new(MemoryStore::new());
        assert!(storage.load().is_empty());
        assert!(storage.try_load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_record_loads_empty() {
        let storage = ProductStorage::new(MemoryStore::with_entry(
            snapshot::STORAGE_KEY,
            "{not json",
        ));
        assert!(storage.load().is_empty());
        assert!(storage.try_load().is_err());
    }

    #[test]
    fn save_then_load() {
        let mut storage = ProductStorage::new(MemoryStore::new());
        storage.save(&products());

        assert_eq!(storage.load(), products());
        assert!(storage
            .store()
            .get(snapshot::STORAGE_KEY)
            .unwrap()
            .unwrap()
            .starts_with('['));
    }

    #[test]
    fn save_failure_is_swallowed() {
        let mut storage = ProductStorage::new(FailingStore::default());
        storage.save(&products());
        assert_eq!(storage.store().attempts, 1);
        assert!(storage.try_save(&products()).is_err());
    }

    #[test]
    fn custom_key_and_clear() {
        let mut storage = ProductStorage::with_key(MemoryStore::new(), "other");
        storage.save(&products());
        assert_eq!(storage.key(), "other");
        assert!(storage.store().get(snapshot::STORAGE_KEY).unwrap().is_none());

        storage.clear().unwrap();
        assert!(storage.store().is_empty());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = temp_dir("roundtrip");
        let _ = fs::remove_dir_all(&dir);

        let mut storage = ProductStorage::new(FileStore::new(&dir));
        assert!(storage.load().is_empty());

        storage.try_save(&products()).unwrap();
        let path = storage.store().path_for(snapshot::STORAGE_KEY);
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());

        // A second handle on the same directory sees the data.
        let reopened = ProductStorage::new(FileStore::new(&dir));
        assert_eq!(reopened.load(), products());

        storage.clear().unwrap();
        storage.clear().unwrap();
        assert!(!path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let store = FileStore::new("/data");
        assert_eq!(
            store.path_for("product-management-app-data"),
            PathBuf::from("/data/product-management-app-data.json")
        );
        assert_eq!(store.path_for("../etc/passwd"), PathBuf::from("/data/___etc_passwd.json"));
    }

    #[test]
    fn boxed_store_delegates() {
        let mut boxed: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        boxed.set("k", "v").unwrap();
        assert_eq!(boxed.get("k").unwrap().as_deref(), Some("v"));
        boxed.remove("k").unwrap();
        assert_eq!(boxed.get("k").unwrap(), None);
    }
}
