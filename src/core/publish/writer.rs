//! Materialization writer
//!
//! Turns a reconciled state into the single published file. Publishing is
//! stage, atomic replace, clean up; readers of the published key observe
//! either the previous file or the new one, never a partial write.

use super::layout::PublishLayout;
use super::staging::StagingArea;
use crate::adapters::storage::ObjectStorage;
use crate::config::schema::delimiter_byte;
use crate::config::ConsolidatorConfig;
use crate::core::codec::{decode_state, encode_state, Dialect};
use crate::core::verification::checksum_bytes;
use crate::domain::{ConsolidatorError, MaterializedState, Result, RunId, TableSchema};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Result of a successful publish
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    /// Key of the published file
    pub published_key: String,

    /// Staging directory used for this publish
    pub staging_prefix: String,

    /// Records in the published state
    pub records: usize,

    /// Size of the published file in bytes
    pub bytes: usize,

    /// SHA-256 of the published bytes
    pub checksum: String,

    /// Set when the staging directory could not be removed
    pub cleanup_error: Option<String>,
}

impl PublishReceipt {
    /// Check if the staging directory was leaked
    pub fn leaked_staging(&self) -> bool {
        self.cleanup_error.is_some()
    }
}

/// Writes materialized state to storage
pub struct MaterializationWriter {
    storage: Arc<dyn ObjectStorage>,
    schema: TableSchema,
    layout: PublishLayout,
    dialect: Dialect,
    retain_staging_on_failure: bool,
    shutdown: Option<watch::Receiver<bool>>,
}

impl MaterializationWriter {
    /// Create a writer
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        schema: TableSchema,
        layout: PublishLayout,
        dialect: Dialect,
    ) -> Self {
        Self {
            storage,
            schema,
            layout,
            dialect,
            retain_staging_on_failure: true,
            shutdown: None,
        }
    }

    /// Create a writer from configuration
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the table schema is invalid.
    pub fn from_config(
        storage: Arc<dyn ObjectStorage>,
        config: &ConsolidatorConfig,
    ) -> Result<Self> {
        let schema = config
            .table
            .schema()
            .map_err(ConsolidatorError::Configuration)?;
        let dialect = Dialect {
            delimiter: delimiter_byte(&config.output.delimiter),
            has_header: config.output.write_header,
        };

        Ok(Self::new(
            storage,
            schema,
            PublishLayout::from_config(&config.storage),
            dialect,
        )
        .with_retain_staging_on_failure(config.publish.retain_staging_on_failure))
    }

    /// Keep the staging directory when the replace fails
    pub fn with_retain_staging_on_failure(mut self, retain: bool) -> Self {
        self.retain_staging_on_failure = retain;
        self
    }

    /// Abort before the replace once the shutdown signal is raised
    pub fn with_shutdown_signal(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Output layout
    pub fn layout(&self) -> &PublishLayout {
        &self.layout
    }

    /// Key of the published file
    pub fn published_key(&self) -> String {
        self.layout.published_key()
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Raw bytes of the published file, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn read_published(&self) -> Result<Option<Vec<u8>>> {
        self.storage.get(&self.published_key()).await
    }

    /// Current published state
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if nothing has been published yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the file does not match the
    /// table schema.
    pub async fn load_current(&self) -> Result<Option<MaterializedState>> {
        match self.read_published().await? {
            Some(bytes) => {
                let state = decode_state(&self.schema, &bytes, self.dialect)?;
                tracing::debug!(
                    published = %self.published_key(),
                    records = state.len(),
                    "Loaded current state"
                );
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    /// Publish a state
    ///
    /// 1. Serialize the state into a fresh staging directory
    /// 2. Atomically replace the published file with the staged part
    /// 3. Remove the staging directory
    ///
    /// # Errors
    ///
    /// - Step 1: the underlying storage error; published file untouched
    /// - Shutdown requested before step 2: `Cancelled`; published file untouched
    /// - Step 2: `PublishFailure`; published file untouched
    ///
    /// A step 3 failure is not an error: it is logged and recorded in the
    /// receipt's `cleanup_error`.
    pub async fn publish(
        &self,
        state: &MaterializedState,
        run_id: &RunId,
    ) -> Result<PublishReceipt> {
        let data = encode_state(&self.schema, state, self.dialect)?;
        let bytes = data.len();
        let checksum = checksum_bytes(&data);
        let published_key = self.published_key();

        let staging =
            StagingArea::stage(self.storage.clone(), &self.layout, run_id, data).await?;
        let staging_prefix = staging.prefix().to_string();

        if self.shutdown_requested() {
            tracing::warn!("Shutdown requested, abandoning publish");
            staging.discard().await;
            return Err(ConsolidatorError::Cancelled);
        }

        let replaced = self
            .storage
            .replace(staging.part_key(), &published_key)
            .await;
        if let Err(e) = replaced {
            if self.retain_staging_on_failure {
                let retained = staging.retain();
                tracing::error!(
                    published = %published_key,
                    staging = %retained,
                    error = %e,
                    "Atomic replace failed, staging retained for inspection"
                );
            } else {
                staging.discard().await;
                tracing::error!(published = %published_key, error = %e, "Atomic replace failed");
            }
            return Err(ConsolidatorError::PublishFailure(format!(
                "{published_key}: {e}"
            )));
        }

        tracing::info!(
            published = %published_key,
            records = state.len(),
            bytes,
            checksum = %checksum,
            "Published state"
        );

        let cleanup_error = match staging.cleanup().await {
            Ok(removed) => {
                tracing::debug!(staging = %staging_prefix, removed, "Removed staging directory");
                None
            }
            Err(e) => {
                tracing::warn!(
                    staging = %staging_prefix,
                    error = %e,
                    "Publish succeeded but staging cleanup failed"
                );
                Some(e.to_string())
            }
        };

        Ok(PublishReceipt {
            published_key,
            staging_prefix,
            records: state.len(),
            bytes,
            checksum,
            cleanup_error,
        })
    }

    /// Staging directories currently present under the output prefix
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    pub async fn staging_dirs(&self) -> Result<Vec<String>> {
        let keys = self.storage.list(self.layout.output_prefix()).await?;
        let dirs: BTreeSet<String> = keys
            .iter()
            .filter_map(|key| self.layout.staging_dir_of(key))
            .collect();
        Ok(dirs.into_iter().collect())
    }

    /// Remove every staging directory left behind by earlier runs
    ///
    /// Must not run concurrently with a publish.
    ///
    /// # Returns
    ///
    /// The staging directories removed.
    ///
    /// # Errors
    ///
    /// Returns `CleanupFailure` naming the first directory that could not be
    /// removed.
    pub async fn cleanup_leaked_staging(&self) -> Result<Vec<String>> {
        let dirs = self.staging_dirs().await?;
        for dir in &dirs {
            let removed = self
                .storage
                .delete_prefix(dir)
                .await
                .map_err(|e| ConsolidatorError::CleanupFailure(format!("{dir}: {e}")))?;
            tracing::info!(staging = %dir, removed, "Removed leaked staging directory");
        }
        Ok(dirs)
    }
}
