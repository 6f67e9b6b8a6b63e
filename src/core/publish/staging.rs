//! Scoped staging area for a publish

use super::layout::{PublishLayout, PART_FILE_NAME, SUCCESS_MARKER};
use crate::adapters::storage::{join_key, ObjectStorage};
use crate::domain::{ConsolidatorError, Result, RunId};
use std::sync::Arc;

/// A staging directory holding one fully written part
///
/// Every exit path must end in exactly one of [`StagingArea::cleanup`],
/// [`StagingArea::discard`] or [`StagingArea::retain`]. Dropping an area
/// without doing so logs a warning, since the directory is then leaked.
pub struct StagingArea {
    storage: Arc<dyn ObjectStorage>,
    prefix: String,
    part_key: String,
    finished: bool,
}

impl StagingArea {
    /// Write `data` and the success marker to a fresh staging directory
    ///
    /// # Errors
    ///
    /// Returns the underlying storage error. Whatever was partially written
    /// is removed on a best-effort basis.
    pub async fn stage(
        storage: Arc<dyn ObjectStorage>,
        layout: &PublishLayout,
        run_id: &RunId,
        data: Vec<u8>,
    ) -> Result<Self> {
        let prefix = layout.staging_dir(run_id);
        let part_key = join_key(&[&prefix, PART_FILE_NAME]);
        let area = Self {
            storage,
            prefix,
            part_key,
            finished: false,
        };

        match area.write(data).await {
            Ok(()) => {
                tracing::debug!(staging = %area.prefix, "Staged output");
                Ok(area)
            }
            Err(e) => {
                area.discard().await;
                Err(e)
            }
        }
    }

    async fn write(&self, data: Vec<u8>) -> Result<()> {
        self.storage.put(&self.part_key, data).await?;
        self.storage
            .put(&join_key(&[&self.prefix, SUCCESS_MARKER]), Vec::new())
            .await
    }

    /// Staging directory key
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Key of the staged data part
    pub fn part_key(&self) -> &str {
        &self.part_key
    }

    /// Remove the staging directory
    ///
    /// # Errors
    ///
    /// Returns `CleanupFailure` if the directory cannot be removed.
    pub async fn cleanup(mut self) -> Result<usize> {
        self.finished = true;
        self.storage
            .delete_prefix(&self.prefix)
            .await
            .map_err(|e| ConsolidatorError::CleanupFailure(format!("{}: {e}", self.prefix)))
    }

    /// Remove the staging directory, logging instead of failing
    pub async fn discard(mut self) {
        self.finished = true;
        if let Err(e) = self.storage.delete_prefix(&self.prefix).await {
            tracing::warn!(
                staging = %self.prefix,
                error = %e,
                "Failed to remove staging directory"
            );
        }
    }

    /// Keep the staging directory for inspection and return its key
    pub fn retain(mut self) -> String {
        self.finished = true;
        self.prefix.clone()
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if !self.finished {
            tracing::warn!(staging = %self.prefix, "Staging directory left behind");
        }
    }
}
