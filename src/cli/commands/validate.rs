//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Consolidator configuration file.

use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates as part of loading
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Table: {}", config.table.name);
        println!(
            "  Columns: {}, {}",
            config.table.key_field,
            config.table.value_fields.join(", ")
        );
        println!("  Storage Backend: {:?}", config.storage.backend);
        println!("  Storage Root: {}", config.storage.root);
        println!("  Input Prefix: {}", config.storage.input_prefix);
        println!(
            "  Published File: {}/{}",
            config.storage.output_prefix, config.storage.published_name
        );
        println!(
            "  Input: delimiter '{}', header {}",
            config.input.delimiter, config.input.has_header
        );
        println!(
            "  Output: delimiter '{}', header {}",
            config.output.delimiter, config.output.write_header
        );
        println!(
            "  Ledger: {}",
            if config.ledger.enabled {
                config.ledger.file_name.as_str()
            } else {
                "disabled"
            }
        );
        println!();
        Ok(0)
    }
}
