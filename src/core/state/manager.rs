//! Ledger manager for batch ledger persistence
//!
//! The ledger lives next to the published file and is written with the same
//! stage-then-replace primitive, so readers never see a torn document.

use crate::adapters::storage::{join_key, ObjectStorage};
use crate::core::state::ledger::{BatchEntry, BatchLedger};
use crate::domain::{ConsolidatorError, Result};
use chrono::Utc;
use std::sync::Arc;

/// Ledger manager
///
/// Loads and saves the [`BatchLedger`] document through the storage
/// collaborator.
pub struct LedgerManager {
    storage: Arc<dyn ObjectStorage>,
    key: String,
}

impl LedgerManager {
    /// Create a ledger manager for `{output_prefix}/{file_name}`
    pub fn new(storage: Arc<dyn ObjectStorage>, output_prefix: &str, file_name: &str) -> Self {
        Self {
            storage,
            key: join_key(&[output_prefix, file_name]),
        }
    }

    /// Key of the ledger document
    pub fn key(&self) -> &str {
        &self.key
    }

    fn staging_key(&self) -> String {
        format!("{}.tmp", self.key)
    }

    /// Load the ledger
    ///
    /// # Returns
    ///
    /// Returns an empty ledger if none has been written yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the document is not valid JSON.
    pub async fn load(&self) -> Result<BatchLedger> {
        match self.storage.get(&self.key).await? {
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                ConsolidatorError::Serialization(format!(
                    "Ledger {} is not valid JSON: {e}",
                    self.key
                ))
            }),
            None => Ok(BatchLedger::default()),
        }
    }

    /// Save the ledger atomically
    ///
    /// # Errors
    ///
    /// Returns an error if staging or the replace fails.
    pub async fn save(&self, ledger: &mut BatchLedger) -> Result<()> {
        ledger.updated_at = Some(Utc::now());
        let bytes = serde_json::to_vec_pretty(ledger)?;

        let staging_key = self.staging_key();
        self.storage.put(&staging_key, bytes).await?;
        self.storage.replace(&staging_key, &self.key).await?;
        Ok(())
    }

    /// Record one entry and save the ledger
    ///
    /// The ledger is reloaded first so entries written since the caller's
    /// last load are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the load or save fails.
    pub async fn checkpoint(&self, entry: BatchEntry) -> Result<()> {
        tracing::debug!(
            batch_id = %entry.batch_id,
            run_id = %entry.run_id,
            status = ?entry.status,
            "Checkpointing batch ledger"
        );

        let mut ledger = self.load().await?;
        ledger.record(entry);
        self.save(&mut ledger).await
    }
}
