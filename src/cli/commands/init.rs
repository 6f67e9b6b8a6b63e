//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "consolidator.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Consolidator configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        match fs::write(&self.output, Self::generate_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your table layout and storage root", self.output);
                println!("  2. Validate configuration: consolidator validate-config");
                println!("  3. Apply a batch: consolidator process <BATCH_ID>");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate the sample configuration
    pub(crate) fn generate_config() -> String {
        r#"# Consolidator Configuration File
# Applies snapshot and delta batches to a single published table

[application]
log_level = "info"   # trace | debug | info | warn | error
dry_run = false

[table]
name = "person"
key_field = "PersonID"
value_fields = ["FullName", "City"]

[storage]
backend = "local"    # local | memory
root = "./data"
input_prefix = "intermediate_data/world/Person_Lewis"
output_prefix = "des_file"
published_name = "final_output.csv"
staging_prefix = "temp_output"

[input]
delimiter = ","
has_header = false

[output]
delimiter = ","
write_header = true

[publish]
# Keep the staging directory when the atomic replace fails
retain_staging_on_failure = true

[ledger]
enabled = true
file_name = "_ledger.json"
# Skip batches already published (override with `process --force`)
skip_processed = true

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"   # daily | hourly | never
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_generated_config_is_valid() {
        let config = parse_config(&InitArgs::generate_config()).unwrap();
        assert_eq!(config.table.name, "person");
        assert_eq!(config.storage.published_name, "final_output.csv");
        assert!(config.ledger.enabled);
    }

    #[tokio::test]
    async fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("consolidator.toml");
        fs::write(&output, "existing").unwrap();

        let args = InitArgs {
            output: output.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().await.unwrap(), 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "existing");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().await.unwrap(), 0);
        assert!(fs::read_to_string(&output).unwrap().contains("[table]"));
    }
}
