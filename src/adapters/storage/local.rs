//! Local filesystem storage backend
//!
//! Objects are files under a root directory. `replace` is a single
//! `rename(2)` inside the root, which is atomic on POSIX filesystems.

use super::traits::ObjectStorage;
use super::{key_segments, key_under_prefix};
use crate::domain::{ConsolidatorError, Result, StorageError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Filesystem-backed object storage
#[derive(Debug, Clone)]
pub struct LocalFsStorage {
    root: PathBuf,
}

impl LocalFsStorage {
    /// Open a storage root, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the root cannot be created or is not a directory.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await.map_err(|e| {
            StorageError::WriteFailed(format!(
                "cannot create storage root {}: {e}",
                root.display()
            ))
        })?;

        let metadata = tokio::fs::metadata(&root).await.map_err(|e| {
            StorageError::ReadFailed(format!("cannot stat storage root {}: {e}", root.display()))
        })?;
        if !metadata.is_dir() {
            return Err(StorageError::InvalidKey(format!(
                "storage root {} is not a directory",
                root.display()
            ))
            .into());
        }

        tracing::debug!(root = %root.display(), "Opened local storage");
        Ok(Self { root })
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let mut path = self.root.clone();
        for segment in key_segments(key)? {
            path.push(segment);
        }
        Ok(path)
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }

    async fn ensure_parent(path: &Path) -> std::io::Result<()> {
        match path.parent() {
            Some(parent) => tokio::fs::create_dir_all(parent).await,
            None => Ok(()),
        }
    }

    /// Recursively collect files under `dir`
    async fn walk(&self, dir: PathBuf) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir];

        while let Some(current) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(StorageError::ListFailed(format!(
                        "{}: {e}",
                        current.display()
                    ))
                    .into())
                }
            };

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| StorageError::ListFailed(format!("{}: {e}", current.display())))?
            {
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| StorageError::ListFailed(e.to_string()))?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else {
                    files.push(entry.path());
                }
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl ObjectStorage for LocalFsStorage {
    fn describe(&self) -> String {
        format!("file://{}", self.root.display())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!("{key}: {e}")).into()),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()> {
        let path = self.resolve(key)?;
        Self::ensure_parent(&path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{key}: {e}")))?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("{key}: {e}")))?;
        Ok(())
    }

    async fn replace(&self, source: &str, target: &str) -> Result<()> {
        let source_path = self.resolve(source)?;
        let target_path = self.resolve(target)?;

        if !tokio::fs::try_exists(&source_path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(source.to_string()).into());
        }

        Self::ensure_parent(&target_path)
            .await
            .map_err(|e| StorageError::ReplaceFailed(format!("{target}: {e}")))?;
        tokio::fs::rename(&source_path, &target_path)
            .await
            .map_err(|e| StorageError::ReplaceFailed(format!("{source} -> {target}: {e}")))?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let path = self.resolve(prefix)?;
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(StorageError::DeleteFailed(format!("{prefix}: {e}")).into()),
        };

        if metadata.is_dir() {
            let count = self.walk(path.clone()).await?.len();
            tokio::fs::remove_dir_all(&path)
                .await
                .map_err(|e| StorageError::DeleteFailed(format!("{prefix}: {e}")))?;
            Ok(count)
        } else {
            tokio::fs::remove_file(&path)
                .await
                .map_err(|e| StorageError::DeleteFailed(format!("{prefix}: {e}")))?;
            Ok(1)
        }
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let path = self.resolve(prefix)?;
        let metadata = tokio::fs::metadata(&path).await;
        let mut keys = match metadata {
            Ok(m) if m.is_dir() => self
                .walk(path)
                .await?
                .iter()
                .filter_map(|p| self.key_for(p))
                .filter(|k| key_under_prefix(k, prefix))
                .collect::<Vec<_>>(),
            Ok(_) => vec![prefix.to_string()],
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => {
                return Err(ConsolidatorError::Storage(StorageError::ListFailed(format!(
                    "{prefix}: {e}"
                ))))
            }
        };
        keys.sort();
        Ok(keys)
    }
}
