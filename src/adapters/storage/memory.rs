//! In-memory storage backend
//!
//! Thread-safe via `RwLock`. Used by tests and by `backend = "memory"` for
//! dry experiments; nothing survives the process.

use super::traits::ObjectStorage;
use super::{key_segments, key_under_prefix};
use crate::domain::{ConsolidatorError, Result, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory object storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.objects
            .read()
            .map_err(|_| ConsolidatorError::Other("memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.objects
            .write()
            .map_err(|_| ConsolidatorError::Other("memory storage lock poisoned".to_string()))
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    fn describe(&self) -> String {
        "memory://".to_string()
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        key_segments(key)?;
        Ok(self.read()?.get(key).cloned())
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        key_segments(key)?;
        self.write()?.insert(key.to_string(), data);
        Ok(())
    }

    async fn replace(&self, source: &str, target: &str) -> Result<()> {
        key_segments(source)?;
        key_segments(target)?;

        let mut objects = self.write()?;
        let data = objects
            .remove(source)
            .ok_or_else(|| StorageError::NotFound(source.to_string()))?;
        objects.insert(target.to_string(), data);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        key_segments(prefix)?;
        let mut objects = self.write()?;
        let before = objects.len();
        objects.retain(|key, _| !key_under_prefix(key, prefix));
        Ok(before - objects.len())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        key_segments(prefix)?;
        Ok(self
            .read()?
            .keys()
            .filter(|key| key_under_prefix(key, prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_and_replace() {
        let storage = MemoryStorage::new();
        storage.put("out/tmp/part", b"new".to_vec()).await.unwrap();
        storage.put("out/final.csv", b"old".to_vec()).await.unwrap();

        storage.replace("out/tmp/part", "out/final.csv").await.unwrap();

        assert_eq!(storage.get("out/final.csv").await.unwrap(), Some(b"new".to_vec()));
        assert!(!storage.exists("out/tmp/part").await.unwrap());
    }

    #[tokio::test]
    async fn test_replace_missing_source() {
        let storage = MemoryStorage::new();
        let err = storage.replace("nope", "target").await.unwrap_err();
        assert!(matches!(
            err,
            ConsolidatorError::Storage(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_prefix_is_directory_style() {
        let storage = MemoryStorage::new();
        storage.put("out/tmp_1/a", vec![]).await.unwrap();
        storage.put("out/tmp_1/b", vec![]).await.unwrap();
        storage.put("out/tmp_10/a", vec![]).await.unwrap();

        assert_eq!(storage.delete_prefix("out/tmp_1").await.unwrap(), 2);
        assert_eq!(storage.list("out").await.unwrap(), vec!["out/tmp_10/a"]);
    }

    #[tokio::test]
    async fn test_clones_share_objects() {
        let storage = MemoryStorage::new();
        let clone = storage.clone();
        storage.put("k", vec![7]).await.unwrap();
        assert_eq!(clone.get("k").await.unwrap(), Some(vec![7]));
    }
}
