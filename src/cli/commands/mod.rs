//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod cleanup;
pub mod init;
pub mod process;
pub mod status;
pub mod validate;

use crate::adapters::storage::{create_storage, ObjectStorage};
use crate::config::{load_config, ConsolidatorConfig};
use std::sync::Arc;

/// Load configuration, printing the failure and its exit code on error
pub(crate) fn load_or_report(config_path: &str) -> Result<ConsolidatorConfig, i32> {
    load_config(config_path).map_err(|e| {
        println!("❌ Failed to load configuration file");
        println!("   Error: {e}");
        e.exit_code()
    })
}

/// Open the configured storage, printing the failure and its exit code on error
pub(crate) async fn storage_or_report(
    config: &ConsolidatorConfig,
) -> Result<Arc<dyn ObjectStorage>, i32> {
    create_storage(&config.storage).await.map_err(|e| {
        println!("❌ Failed to open storage");
        println!("   Error: {e}");
        e.exit_code()
    })
}
