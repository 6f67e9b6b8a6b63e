//! Cleanup command implementation
//!
//! Removes staging directories that earlier runs could not delete. Must not
//! run while a `process` run is publishing to the same table.

use super::{load_or_report, storage_or_report};
use crate::core::publish::MaterializationWriter;
use clap::Args;

/// Arguments for the cleanup command
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// List leaked staging directories without removing them
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanupArgs {
    /// Execute the cleanup command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Cleaning up leaked staging directories");

        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };
        let storage = match storage_or_report(&config).await {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };
        let writer = MaterializationWriter::from_config(storage, &config)?;

        let result = if self.dry_run {
            writer.staging_dirs().await
        } else {
            writer.cleanup_leaked_staging().await
        };

        match result {
            Ok(dirs) if dirs.is_empty() => {
                println!("✅ No staging directories found");
                Ok(0)
            }
            Ok(dirs) => {
                let verb = if self.dry_run { "Found" } else { "Removed" };
                println!("✅ {verb} {} staging director(ies):", dirs.len());
                for dir in &dirs {
                    println!("  - {dir}");
                }
                Ok(0)
            }
            Err(e) => {
                println!("❌ Cleanup failed: {e}");
                Ok(e.exit_code())
            }
        }
    }
}
