//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use consolidator::adapters::storage::{LocalFsStorage, ObjectStorage};
use consolidator::config::ConsolidatorConfig;
use consolidator::core::consolidate::ConsolidationCoordinator;
use consolidator::domain::{BatchId, Result, StorageError};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

pub const PUBLISHED: &str = "des_file/final_output.csv";
pub const INPUT_PREFIX: &str = "intermediate_data/world/Person_Lewis";

/// Configuration rooted at `root` with every other setting at its default
pub fn config_for(root: &Path) -> ConsolidatorConfig {
    let mut config = ConsolidatorConfig::default();
    config.storage.root = root.to_string_lossy().to_string();
    config
}

/// A temporary storage root
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn config(&self) -> ConsolidatorConfig {
        config_for(self.dir.path())
    }

    pub async fn storage(&self) -> LocalFsStorage {
        LocalFsStorage::open(self.root()).await.unwrap()
    }

    /// Write an input batch and return its ID
    pub fn deliver(&self, name: &str, body: &str) -> BatchId {
        let dir = self.dir.path().join(INPUT_PREFIX);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(name), body).unwrap();
        name.parse().unwrap()
    }

    /// Published file content, if any
    pub fn published(&self) -> Option<String> {
        std::fs::read_to_string(self.dir.path().join(PUBLISHED)).ok()
    }

    /// Names of entries directly under the output prefix
    pub fn output_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.dir.path().join("des_file"))
            .map(|entries| {
                entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn staging_dirs(&self) -> Vec<String> {
        self.output_entries()
            .into_iter()
            .filter(|name| name.starts_with("temp_output_"))
            .collect()
    }

    pub async fn coordinator(&self) -> ConsolidationCoordinator {
        self.coordinator_with(self.config(), Arc::new(self.storage().await))
    }

    pub fn coordinator_with(
        &self,
        config: ConsolidatorConfig,
        storage: Arc<dyn ObjectStorage>,
    ) -> ConsolidationCoordinator {
        let (_tx, rx) = watch::channel(false);
        ConsolidationCoordinator::new(config, storage, rx).unwrap()
    }
}

/// Storage wrapper that fails selected operations on demand
pub struct FaultyStorage {
    inner: Arc<dyn ObjectStorage>,
    fail_replace_into: Option<String>,
    pub fail_delete: AtomicBool,
}

impl FaultyStorage {
    pub fn new(inner: Arc<dyn ObjectStorage>) -> Self {
        Self {
            inner,
            fail_replace_into: None,
            fail_delete: AtomicBool::new(false),
        }
    }

    /// Fail every replace whose target is `target`
    pub fn failing_replace_into(mut self, target: &str) -> Self {
        self.fail_replace_into = Some(target.to_string());
        self
    }

    /// Fail every delete
    pub fn failing_delete(self) -> Self {
        self.fail_delete.store(true, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ObjectStorage for FaultyStorage {
    fn describe(&self) -> String {
        format!("faulty+{}", self.inner.describe())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        self.inner.put(key, data).await
    }

    async fn replace(&self, source: &str, target: &str) -> Result<()> {
        if self.fail_replace_into.as_deref() == Some(target) {
            return Err(StorageError::ReplaceFailed(format!("injected failure for {target}")).into());
        }
        self.inner.replace(source, target).await
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed(format!("injected failure for {prefix}")).into());
        }
        self.inner.delete_prefix(prefix).await
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.inner.list(prefix).await
    }
}
