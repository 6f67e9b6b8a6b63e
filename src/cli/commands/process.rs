//! Process command implementation
//!
//! This module implements the `process` command, which applies one input
//! batch to the published table.

use super::{load_or_report, storage_or_report};
use crate::core::consolidate::{ConsolidationCoordinator, RunOutcome, RunSummary};
use crate::domain::BatchId;
use clap::Args;
use tokio::sync::watch;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input batch identifier (file name under the input prefix)
    pub batch_id: String,

    /// Override the storage root
    #[arg(long)]
    pub root: Option<String>,

    /// Dry run mode - reconcile without publishing
    #[arg(long)]
    pub dry_run: bool,

    /// Reprocess the batch even if the ledger shows it was published
    #[arg(long)]
    pub force: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessArgs {
    /// Execute the process command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!(batch_id = %self.batch_id, "Starting process command");

        let mut config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        if let Some(root) = &self.root {
            tracing::info!(root = %root, "Overriding storage root from CLI");
            config.storage.root = root.clone();
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            println!("❌ Configuration validation failed: {e}");
            return Ok(2);
        }

        let batch_id: BatchId = match self.batch_id.parse() {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid batch ID: {e}");
                return Ok(3);
            }
        };

        if config.application.dry_run && !self.json {
            println!("🔍 DRY RUN MODE - the published table will not be changed");
            println!();
        }

        let storage = match storage_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };

        let coordinator = match ConsolidationCoordinator::new(config, storage, shutdown_signal) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create consolidation coordinator");
                println!("❌ Failed to initialize: {e}");
                return Ok(e.exit_code());
            }
        };

        match coordinator.process_batch(&batch_id, self.force).await {
            Ok(summary) => {
                if self.json {
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                } else {
                    print_summary(&summary);
                }
                Ok(0)
            }
            Err(e) => {
                if e.is_batch_rejection() {
                    println!("❌ Batch rejected: {e}");
                    println!("   The published table was not changed.");
                } else {
                    println!("❌ Run failed: {e}");
                }
                Ok(e.exit_code())
            }
        }
    }
}

fn print_summary(summary: &RunSummary) {
    let headline = match summary.outcome {
        RunOutcome::Published => "✅ Batch published",
        RunOutcome::DryRun => "✅ Dry run completed",
        RunOutcome::Skipped => "⏭️  Batch already published, skipped (use --force to reprocess)",
    };
    println!("{headline}");
    println!();
    println!("  Run: {}", summary.run_id);
    println!("  Batch: {}", summary.batch_id);

    if summary.outcome != RunOutcome::Skipped {
        if let Some(kind) = summary.kind {
            println!("  Kind: {kind}");
        }
        println!("  Rows read: {}", summary.rows_read);
        println!(
            "  Inserts: {}  Updates: {}  Deletes: {}",
            summary.stats.inserts, summary.stats.updates, summary.stats.deletes
        );
        if let Some(before) = summary.records_before {
            println!("  Records before: {before}");
        }
        println!("  Records after: {}", summary.records_after);
    }

    if let Some(receipt) = &summary.receipt {
        println!("  Published: {} ({} bytes)", receipt.published_key, receipt.bytes);
        println!("  Checksum: {}", receipt.checksum);
    }
    println!("  Duration: {} ms", summary.duration.as_millis());

    for warning in &summary.warnings {
        println!("⚠️  {warning}");
    }
}
