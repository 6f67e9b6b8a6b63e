//! Configuration management for Consolidator.
//!
//! Consolidator uses a TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CONSOLIDATOR_<SECTION>_<KEY>` environment overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use consolidator::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("consolidator.toml")?;
//! println!("Published file: {}/{}", config.storage.output_prefix, config.storage.published_name);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [table]
//! name = "person"
//! key_field = "PersonID"
//! value_fields = ["FullName", "City"]
//!
//! [storage]
//! backend = "local"
//! root = "${CONSOLIDATOR_DATA_ROOT}"
//! input_prefix = "intermediate_data/world/Person_Lewis"
//! output_prefix = "des_file"
//! published_name = "final_output.csv"
//!
//! [input]
//! has_header = false
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, parse_config};
pub use schema::{
    ApplicationConfig, ConsolidatorConfig, InputConfig, LedgerConfig, LoggingConfig,
    OutputConfig, PublishConfig, StorageBackendKind, StorageConfig, TableConfig,
};
