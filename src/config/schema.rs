//! Configuration schema types
//!
//! This module defines the configuration structure for Consolidator.

use crate::domain::TableSchema;
use serde::{Deserialize, Serialize};

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    /// Files under a local directory
    #[default]
    Local,
    /// Process-local memory (nothing is persisted)
    Memory,
}

/// Main Consolidator configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConsolidatorConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Tracked table layout
    #[serde(default)]
    pub table: TableConfig,

    /// Storage locations
    #[serde(default)]
    pub storage: StorageConfig,

    /// Input batch dialect
    #[serde(default)]
    pub input: InputConfig,

    /// Published file dialect
    #[serde(default)]
    pub output: OutputConfig,

    /// Publish behaviour
    #[serde(default)]
    pub publish: PublishConfig,

    /// Processed-batch ledger
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ConsolidatorConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.table.validate()?;
        self.storage.validate()?;
        self.input.validate()?;
        self.output.validate()?;
        self.ledger.validate(&self.storage)?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (reconcile but never publish)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Tracked table configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Table name (informational)
    #[serde(default = "default_table_name")]
    pub name: String,

    /// Primary-key field name
    #[serde(default = "default_key_field")]
    pub key_field: String,

    /// Ordered value field names
    #[serde(default = "default_value_fields")]
    pub value_fields: Vec<String>,
}

impl TableConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("table.name cannot be empty".to_string());
        }
        if self.value_fields.is_empty() {
            return Err("table.value_fields must list at least one field".to_string());
        }
        self.schema().map(|_| ()).map_err(|e| format!("table: {e}"))
    }

    /// Builds the table schema
    ///
    /// # Errors
    ///
    /// Returns an error if the field names are invalid.
    pub fn schema(&self) -> Result<TableSchema, String> {
        TableSchema::new(self.key_field.clone(), self.value_fields.clone())
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: default_table_name(),
            key_field: default_key_field(),
            value_fields: default_value_fields(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Backend kind
    #[serde(default)]
    pub backend: StorageBackendKind,

    /// Storage root (directory for the local backend)
    #[serde(default = "default_storage_root")]
    pub root: String,

    /// Prefix under which input batches arrive
    #[serde(default = "default_input_prefix")]
    pub input_prefix: String,

    /// Prefix holding the published file, staging areas and the ledger
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,

    /// Name of the published file under `output_prefix`
    #[serde(default = "default_published_name")]
    pub published_name: String,

    /// Name prefix of staging directories under `output_prefix`
    #[serde(default = "default_staging_prefix")]
    pub staging_prefix: String,
}

impl StorageConfig {
    fn validate(&self) -> Result<(), String> {
        if self.backend == StorageBackendKind::Local && self.root.trim().is_empty() {
            return Err("storage.root cannot be empty for the local backend".to_string());
        }

        for (name, value) in [
            ("storage.input_prefix", &self.input_prefix),
            ("storage.output_prefix", &self.output_prefix),
        ] {
            validate_key_path(name, value)?;
        }

        for (name, value) in [
            ("storage.published_name", &self.published_name),
            ("storage.staging_prefix", &self.staging_prefix),
        ] {
            if value.is_empty() || value.contains('/') || value == "." || value == ".." {
                return Err(format!("{name} must be a single non-empty path segment"));
            }
        }

        if self.published_name.starts_with(&self.staging_prefix) {
            return Err(format!(
                "storage.published_name '{}' must not start with storage.staging_prefix '{}'",
                self.published_name, self.staging_prefix
            ));
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::default(),
            root: default_storage_root(),
            input_prefix: default_input_prefix(),
            output_prefix: default_output_prefix(),
            published_name: default_published_name(),
            staging_prefix: default_staging_prefix(),
        }
    }
}

/// Input batch dialect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Single-character field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Whether batch files start with a header row
    #[serde(default)]
    pub has_header: bool,
}

impl InputConfig {
    fn validate(&self) -> Result<(), String> {
        validate_delimiter("input.delimiter", &self.delimiter)
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            has_header: false,
        }
    }
}

/// Published file dialect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Single-character field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Whether the published file starts with a header row
    #[serde(default = "default_true")]
    pub write_header: bool,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        validate_delimiter("output.delimiter", &self.delimiter)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            write_header: true,
        }
    }
}

/// Publish configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Keep the staging directory when the atomic replace fails
    #[serde(default = "default_true")]
    pub retain_staging_on_failure: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            retain_staging_on_failure: true,
        }
    }
}

/// Processed-batch ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Record processed batches
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Ledger file name under `storage.output_prefix`
    #[serde(default = "default_ledger_file_name")]
    pub file_name: String,

    /// Skip batches the ledger already records as completed
    #[serde(default = "default_true")]
    pub skip_processed: bool,
}

impl LedgerConfig {
    /// The ledger and its `.tmp` sibling share the output prefix with the
    /// published file and staging dirs, so neither may collide with them.
    fn validate(&self, storage: &StorageConfig) -> Result<(), String> {
        if !self.enabled {
            return Ok(());
        }

        let name = self.file_name.as_str();
        if name.is_empty() || name.contains('/') || name == "." || name == ".." {
            return Err("ledger.file_name must be a single non-empty path segment".to_string());
        }

        let staging_name = format!("{name}.tmp");
        if name == storage.published_name || staging_name == storage.published_name {
            return Err(format!(
                "ledger.file_name '{name}' collides with storage.published_name '{}'",
                storage.published_name
            ));
        }
        if name.starts_with(&storage.staging_prefix) {
            return Err(format!(
                "ledger.file_name '{name}' must not start with storage.staging_prefix '{}'",
                storage.staging_prefix
            ));
        }
        Ok(())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file_name: default_ledger_file_name(),
            skip_processed: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

/// Returns the single byte of a validated delimiter string
///
/// Falls back to `,` for an invalid value; validation rejects those first.
pub fn delimiter_byte(delimiter: &str) -> u8 {
    match delimiter.as_bytes() {
        [b] => *b,
        _ => b',',
    }
}

fn validate_delimiter(name: &str, value: &str) -> Result<(), String> {
    match value.as_bytes() {
        [b] if *b != b'"' && *b != b'\n' && *b != b'\r' => Ok(()),
        _ => Err(format!(
            "{name} must be a single ASCII character other than a quote or newline, got '{value}'"
        )),
    }
}

fn validate_key_path(name: &str, value: &str) -> Result<(), String> {
    let trimmed = value.trim_matches('/');
    if trimmed.is_empty() {
        return Err(format!("{name} cannot be empty"));
    }
    if trimmed
        .split('/')
        .any(|s| s.is_empty() || s == "." || s == "..")
    {
        return Err(format!("{name} contains an invalid path segment: '{value}'"));
    }
    Ok(())
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_table_name() -> String {
    "person".to_string()
}

fn default_key_field() -> String {
    "PersonID".to_string()
}

fn default_value_fields() -> Vec<String> {
    vec!["FullName".to_string(), "City".to_string()]
}

fn default_storage_root() -> String {
    "./data".to_string()
}

fn default_input_prefix() -> String {
    "intermediate_data/world/Person_Lewis".to_string()
}

fn default_output_prefix() -> String {
    "des_file".to_string()
}

fn default_published_name() -> String {
    "final_output.csv".to_string()
}

fn default_staging_prefix() -> String {
    "temp_output".to_string()
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_ledger_file_name() -> String {
    "_ledger.json".to_string()
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
