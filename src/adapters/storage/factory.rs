//! Storage backend factory
//!
//! This module provides the factory function that creates the storage
//! backend selected in configuration.

use crate::adapters::storage::local::LocalFsStorage;
use crate::adapters::storage::memory::MemoryStorage;
use crate::adapters::storage::traits::ObjectStorage;
use crate::config::schema::{StorageBackendKind, StorageConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create a storage backend based on the configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements ObjectStorage
///
/// # Errors
///
/// Returns an error if the local storage root cannot be opened
pub async fn create_storage(config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>> {
    match config.backend {
        StorageBackendKind::Local => {
            tracing::debug!(root = %config.root, "Creating local storage backend");
            let storage = LocalFsStorage::open(&config.root).await?;
            Ok(Arc::new(storage) as Arc<dyn ObjectStorage>)
        }
        StorageBackendKind::Memory => {
            tracing::debug!("Creating in-memory storage backend");
            Ok(Arc::new(MemoryStorage::new()) as Arc<dyn ObjectStorage>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_local_storage() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            root: dir.path().join("data").to_string_lossy().to_string(),
            ..StorageConfig::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert!(storage.describe().starts_with("file://"));
        assert!(dir.path().join("data").is_dir());
    }

    #[tokio::test]
    async fn test_create_memory_storage() {
        let config = StorageConfig {
            backend: StorageBackendKind::Memory,
            ..StorageConfig::default()
        };

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.describe(), "memory://");
    }
}
