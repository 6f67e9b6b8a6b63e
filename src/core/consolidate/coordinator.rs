//! Consolidation coordinator - runs one input batch end to end
//!
//! read batch → decode → classify → load current state (deltas only) →
//! reconcile → publish → record in the ledger

use super::summary::{RunOutcome, RunSummary};
use crate::adapters::storage::{join_key, ObjectStorage};
use crate::config::schema::delimiter_byte;
use crate::config::ConsolidatorConfig;
use crate::core::classify::classify;
use crate::core::codec::{decode_rows, Dialect};
use crate::core::publish::MaterializationWriter;
use crate::core::reconcile::reconcile_with_stats;
use crate::core::state::{BatchEntry, LedgerManager};
use crate::core::verification::checksum_bytes;
use crate::domain::{
    BatchId, BatchKind, ConsolidatorError, RawBatch, Result, RunId, TableSchema,
};
use crate::{log_error_with_context, log_run_complete, log_run_start};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Consolidation coordinator
///
/// Owns the writer and ledger for one table. One coordinator processes one
/// batch at a time; running two coordinators on the same table concurrently
/// is last-writer-wins.
pub struct ConsolidationCoordinator {
    config: ConsolidatorConfig,
    schema: TableSchema,
    storage: Arc<dyn ObjectStorage>,
    writer: MaterializationWriter,
    ledger: Option<LedgerManager>,
    input_dialect: Dialect,
    shutdown_signal: watch::Receiver<bool>,
}

impl ConsolidationCoordinator {
    /// Create a new coordinator
    ///
    /// # Errors
    ///
    /// Returns a `Configuration` error if the configuration is invalid.
    pub fn new(
        config: ConsolidatorConfig,
        storage: Arc<dyn ObjectStorage>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(ConsolidatorError::Configuration)?;

        let schema = config
            .table
            .schema()
            .map_err(ConsolidatorError::Configuration)?;
        let writer = MaterializationWriter::from_config(storage.clone(), &config)?
            .with_shutdown_signal(shutdown_signal.clone());
        let ledger = config.ledger.enabled.then(|| {
            LedgerManager::new(
                storage.clone(),
                &config.storage.output_prefix,
                &config.ledger.file_name,
            )
        });
        let input_dialect = Dialect {
            delimiter: delimiter_byte(&config.input.delimiter),
            has_header: config.input.has_header,
        };

        tracing::debug!(
            table = %config.table.name,
            storage = %storage.describe(),
            published = %writer.published_key(),
            ledger = config.ledger.enabled,
            "Created consolidation coordinator"
        );

        Ok(Self {
            config,
            schema,
            storage,
            writer,
            ledger,
            input_dialect,
            shutdown_signal,
        })
    }

    /// Materialization writer for this table
    pub fn writer(&self) -> &MaterializationWriter {
        &self.writer
    }

    /// Ledger manager (None when the ledger is disabled)
    pub fn ledger(&self) -> Option<&LedgerManager> {
        self.ledger.as_ref()
    }

    /// Storage key of an input batch
    pub fn input_key(&self, batch_id: &BatchId) -> String {
        join_key(&[&self.config.storage.input_prefix, batch_id.as_str()])
    }

    fn check_shutdown(&self) -> Result<()> {
        if *self.shutdown_signal.borrow() {
            tracing::warn!("Shutdown requested, stopping before publish");
            return Err(ConsolidatorError::Cancelled);
        }
        Ok(())
    }

    /// Process one input batch
    ///
    /// This is the main entry point. It:
    /// 1. Reads the batch and hashes its bytes
    /// 2. Skips the batch if the ledger shows this exact content was already
    ///    published (unless `force` is set or `ledger.skip_processed` is off)
    /// 3. Decodes and classifies the batch
    /// 4. Loads the current published state for a delta
    /// 5. Reconciles
    /// 6. Publishes (skipped in dry-run mode)
    /// 7. Records the outcome in the ledger
    ///
    /// A batch re-delivered under a published name with different content is
    /// reprocessed and the summary carries a warning. An unreadable ledger
    /// disables the skip check for this run and is reported as a warning.
    ///
    /// # Errors
    ///
    /// Rejected batches (`SchemaMismatch`, `UnrecognizedOperation`,
    /// `NoBaseState`, `BatchNotFound`) and `Cancelled` leave the published
    /// file untouched, as does `PublishFailure`. Ledger read and write
    /// failures are never errors; they are reported as summary warnings.
    pub async fn process_batch(&self, batch_id: &BatchId, force: bool) -> Result<RunSummary> {
        let start_time = Instant::now();
        let run_id = RunId::generate(Utc::now());
        let dry_run = self.config.application.dry_run;
        let mut summary = RunSummary::new(run_id.as_str(), batch_id.as_str());

        log_run_start!(&run_id, batch_id);

        let input = self.read_input(batch_id).await;
        let input_checksum = input.as_ref().ok().map(|data| checksum_bytes(data));

        if let Some(ledger) = &self.ledger {
            if self.config.ledger.skip_processed && !force {
                if let Some(previous) = self.completed_entry(ledger, batch_id, &mut summary).await {
                    if input_checksum
                        .as_deref()
                        .is_some_and(|checksum| previous.published_input(checksum))
                    {
                        tracing::info!(
                            batch_id = %batch_id,
                            previous_run = %previous.run_id,
                            "Batch already published, skipping"
                        );
                        let summary = summary.with_duration(start_time.elapsed());
                        summary.log_summary();
                        return Ok(summary);
                    }

                    tracing::warn!(
                        batch_id = %batch_id,
                        previous_run = %previous.run_id,
                        "Batch content differs from the published run, reprocessing"
                    );
                    summary.add_warning(format!(
                        "Batch {batch_id} was published by run {} with different content; reprocessed",
                        previous.run_id
                    ));
                }
            } else if force {
                tracing::info!(batch_id = %batch_id, "Forcing reprocessing of batch");
            }
        }

        let mut entry = BatchEntry::new(batch_id, &run_id).with_input_checksum(input_checksum);

        if !dry_run {
            if let Err(e) = self.record(entry.clone()).await {
                summary.add_warning(e);
            }
        }

        let result = match input {
            Ok(data) => self.run(batch_id, &data, &run_id, dry_run, &mut summary).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                if let (false, Some(kind), Some(receipt)) =
                    (dry_run, summary.kind, summary.receipt.as_ref())
                {
                    entry.mark_completed(
                        kind,
                        summary.rows_read,
                        receipt.records,
                        receipt.checksum.clone(),
                    );
                    if let Err(e) = self.record(entry).await {
                        summary.add_warning(e);
                    }
                }

                let summary = summary.with_duration(start_time.elapsed());
                log_run_complete!(&run_id, summary.records_after, summary.duration);
                summary.log_summary();
                Ok(summary)
            }
            Err(e) => {
                let context = format!("Run {run_id} on batch {batch_id} failed");
                log_error_with_context!(&e, context.as_str());
                if !dry_run {
                    entry.kind = summary.kind;
                    entry.rows_read = summary.rows_read;
                    entry.mark_failed(e.to_string());
                    if let Err(ledger_error) = self.record(entry).await {
                        tracing::warn!(error = %ledger_error, "Could not record failed run");
                    }
                }
                Err(e)
            }
        }
    }

    async fn read_input(&self, batch_id: &BatchId) -> Result<Vec<u8>> {
        let input_key = self.input_key(batch_id);
        self.storage
            .get(&input_key)
            .await?
            .ok_or(ConsolidatorError::BatchNotFound(input_key))
    }

    /// Completed ledger entry for `batch_id`
    ///
    /// A ledger that cannot be read yields `None` and a summary warning.
    async fn completed_entry(
        &self,
        ledger: &LedgerManager,
        batch_id: &BatchId,
        summary: &mut RunSummary,
    ) -> Option<BatchEntry> {
        match ledger.load().await {
            Ok(entries) => entries.get(batch_id).filter(|e| e.is_completed()).cloned(),
            Err(e) => {
                tracing::warn!(
                    ledger = %ledger.key(),
                    error = %e,
                    "Batch ledger unreadable, processing without the skip check"
                );
                summary.add_warning(format!("Ledger unreadable, skip check disabled: {e}"));
                None
            }
        }
    }

    async fn run(
        &self,
        batch_id: &BatchId,
        data: &[u8],
        run_id: &RunId,
        dry_run: bool,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let rows = decode_rows(data, self.input_dialect)?;
        let raw = RawBatch::new(batch_id.clone(), rows);
        summary.rows_read = raw.len();
        tracing::debug!(
            input = %self.input_key(batch_id),
            rows = raw.len(),
            bytes = data.len(),
            "Read input batch"
        );

        let batch = classify(&self.schema, raw)?;
        summary.kind = Some(batch.kind());
        self.check_shutdown()?;

        let current = match batch.kind() {
            BatchKind::Delta => self.writer.load_current().await?,
            BatchKind::Snapshot => None,
        };
        summary.records_before = current.as_ref().map(|state| state.len());

        let outcome = reconcile_with_stats(current.as_ref(), &batch)?;
        summary.stats = outcome.stats;
        summary.records_after = outcome.state.len();
        self.check_shutdown()?;

        if dry_run {
            tracing::info!(
                records = outcome.state.len(),
                published = %self.writer.published_key(),
                "Dry run: skipping publish"
            );
            summary.outcome = RunOutcome::DryRun;
            return Ok(());
        }

        let receipt = self.writer.publish(&outcome.state, run_id).await?;
        if let Some(cleanup_error) = &receipt.cleanup_error {
            summary.add_warning(format!("Staging left behind: {cleanup_error}"));
        }
        summary.outcome = RunOutcome::Published;
        summary.receipt = Some(receipt);
        Ok(())
    }

    /// Write a ledger entry, turning failures into a warning message
    async fn record(&self, entry: BatchEntry) -> std::result::Result<(), String> {
        let Some(ledger) = &self.ledger else {
            return Ok(());
        };
        ledger.checkpoint(entry).await.map_err(|e| {
            tracing::warn!(ledger = %ledger.key(), error = %e, "Failed to update batch ledger");
            format!("Ledger not updated: {e}")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::storage::MemoryStorage;

    fn coordinator(storage: &MemoryStorage, config: ConsolidatorConfig) -> ConsolidationCoordinator {
        let (_tx, rx) = watch::channel(false);
        ConsolidationCoordinator::new(config, Arc::new(storage.clone()), rx).unwrap()
    }

    async fn deliver(storage: &MemoryStorage, name: &str, body: &str) -> BatchId {
        storage
            .put(
                &format!("intermediate_data/world/Person_Lewis/{name}"),
                body.as_bytes().to_vec(),
            )
            .await
            .unwrap();
        name.parse().unwrap()
    }

    #[tokio::test]
    async fn test_snapshot_is_published() {
        let storage = MemoryStorage::new();
        let coordinator = coordinator(&storage, ConsolidatorConfig::default());
        let batch = deliver(&storage, "full.csv", "1,Amy,NYC\n2,Bo,LA\n").await;

        let summary = coordinator.process_batch(&batch, false).await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::Published);
        assert_eq!(summary.kind, Some(BatchKind::Snapshot));
        assert_eq!(summary.records_after, 2);
        assert!(summary.is_clean());
        assert!(storage.exists("des_file/final_output.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_batch() {
        let storage = MemoryStorage::new();
        let coordinator = coordinator(&storage, ConsolidatorConfig::default());

        let err = coordinator
            .process_batch(&"absent.csv".parse().unwrap(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsolidatorError::BatchNotFound(_)));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let storage = MemoryStorage::new();
        let mut config = ConsolidatorConfig::default();
        config.application.dry_run = true;
        let coordinator = coordinator(&storage, config);
        let batch = deliver(&storage, "full.csv", "1,Amy,NYC\n").await;

        let summary = coordinator.process_batch(&batch, false).await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::DryRun);
        assert_eq!(summary.records_after, 1);
        assert!(summary.receipt.is_none());
        assert_eq!(
            storage.list("des_file").await.unwrap(),
            Vec::<String>::new()
        );
    }

    #[tokio::test]
    async fn test_shutdown_before_publish() {
        let storage = MemoryStorage::new();
        let (tx, rx) = watch::channel(false);
        let coordinator =
            ConsolidationCoordinator::new(ConsolidatorConfig::default(), Arc::new(storage.clone()), rx)
                .unwrap();
        let batch = deliver(&storage, "full.csv", "1,Amy,NYC\n").await;
        tx.send(true).unwrap();

        let err = coordinator.process_batch(&batch, false).await.unwrap_err();

        assert!(matches!(err, ConsolidatorError::Cancelled));
        assert!(!storage.exists("des_file/final_output.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_skip_requires_matching_input_checksum() {
        let storage = MemoryStorage::new();
        let coordinator = coordinator(&storage, ConsolidatorConfig::default());
        let batch = deliver(&storage, "full.csv", "1,Amy,NYC\n").await;
        coordinator.process_batch(&batch, false).await.unwrap();

        let again = coordinator.process_batch(&batch, false).await.unwrap();
        assert_eq!(again.outcome, RunOutcome::Skipped);

        deliver(&storage, "full.csv", "1,Amy,SF\n").await;
        let changed = coordinator.process_batch(&batch, false).await.unwrap();
        assert_eq!(changed.outcome, RunOutcome::Published);
        assert_eq!(changed.warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_ledger_is_a_warning() {
        let storage = MemoryStorage::new();
        storage
            .put("des_file/_ledger.json", b"[]garbage".to_vec())
            .await
            .unwrap();
        let coordinator = coordinator(&storage, ConsolidatorConfig::default());
        let batch = deliver(&storage, "full.csv", "1,Amy,NYC\n").await;

        let summary = coordinator.process_batch(&batch, false).await.unwrap();

        assert_eq!(summary.outcome, RunOutcome::Published);
        assert!(summary.warnings.iter().any(|w| w.starts_with("Ledger unreadable")));
        assert!(storage.exists("des_file/final_output.csv").await.unwrap());
    }

    #[tokio::test]
    async fn test_input_key() {
        let storage = MemoryStorage::new();
        let coordinator = coordinator(&storage, ConsolidatorConfig::default());
        assert_eq!(
            coordinator.input_key(&"LOAD00000001.csv".parse().unwrap()),
            "intermediate_data/world/Person_Lewis/LOAD00000001.csv"
        );
    }
}
