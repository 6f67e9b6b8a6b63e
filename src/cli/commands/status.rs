//! Status command implementation
//!
//! This module implements the `status` command for displaying the published
//! table and the batch ledger.

use super::{load_or_report, storage_or_report};
use crate::core::publish::MaterializationWriter;
use crate::core::state::{BatchEntry, BatchLedger, LedgerManager, LedgerStatus};
use crate::core::verification::verify_published;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Recompute the published file's checksum and compare it with the ledger
    #[arg(long)]
    pub verify: bool,

    /// Show at most this many ledger entries (most recent first)
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking consolidation status");

        println!("📊 Consolidation Status");
        println!();

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let storage = match storage_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };
        let writer = MaterializationWriter::from_config(storage.clone(), &config)?;

        println!("Table: {}", config.table.name);
        println!("Storage: {}", storage.describe());
        match writer.load_current().await {
            Ok(Some(state)) => println!(
                "Published: {} ({} records)",
                writer.published_key(),
                state.len()
            ),
            Ok(None) => println!("Published: nothing yet"),
            Err(e) => {
                println!("❌ Failed to read {}", writer.published_key());
                println!("   Error: {e}");
                return Ok(e.exit_code());
            }
        }

        match writer.staging_dirs().await {
            Ok(dirs) if !dirs.is_empty() => println!(
                "⚠️  {} leaked staging director(ies), run 'consolidator cleanup'",
                dirs.len()
            ),
            Ok(_) => {}
            Err(e) => println!("⚠️  Could not list staging directories: {e}"),
        }
        println!();

        let ledger = if config.ledger.enabled {
            let manager = LedgerManager::new(
                storage.clone(),
                &config.storage.output_prefix,
                &config.ledger.file_name,
            );
            match manager.load().await {
                Ok(ledger) => ledger,
                Err(e) => {
                    println!("❌ Failed to load batch ledger");
                    println!("   Error: {e}");
                    return Ok(e.exit_code());
                }
            }
        } else {
            println!("Batch ledger disabled.");
            BatchLedger::default()
        };

        if config.ledger.enabled {
            self.print_ledger(&ledger);
        }

        if self.verify {
            let report = match verify_published(&writer, &ledger).await {
                Ok(r) => r,
                Err(e) => {
                    println!("❌ Verification failed: {e}");
                    return Ok(e.exit_code());
                }
            };
            println!("{}", report.format_summary());
            if !report.is_success() {
                return Ok(5);
            }
        }

        Ok(0)
    }

    fn print_ledger(&self, ledger: &BatchLedger) {
        if ledger.is_empty() {
            println!("No batches processed yet.");
            println!("Run 'consolidator process <BATCH_ID>' to apply a batch.");
            println!();
            return;
        }

        let mut entries: Vec<&BatchEntry> = ledger.entries.values().collect();
        entries.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        println!(
            "Found {} batch(es), showing {}:",
            entries.len(),
            entries.len().min(self.limit)
        );
        println!();
        println!(
            "{:<32} {:<16} {:<10} {:<10} {:<20}",
            "Batch", "Status", "Kind", "Records", "Finished"
        );
        println!("{}", "-".repeat(92));

        for entry in entries.into_iter().take(self.limit) {
            let status = match entry.status {
                LedgerStatus::Completed => "✅ Completed",
                LedgerStatus::InProgress => "🔄 In Progress",
                LedgerStatus::Failed => "❌ Failed",
            };
            let kind = entry
                .kind
                .map(|k| k.to_string())
                .unwrap_or_else(|| "-".to_string());
            let finished = entry
                .completed_at
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());

            println!(
                "{:<32} {:<16} {:<10} {:<10} {:<20}",
                entry.batch_id, status, kind, entry.records_published, finished
            );
            if let Some(error) = &entry.error {
                println!("    {error}");
            }
        }
        println!();
    }
}
