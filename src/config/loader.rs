//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{ConsolidatorConfig, StorageBackendKind};
use crate::domain::errors::ConsolidatorError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into ConsolidatorConfig
/// 4. Applies environment variable overrides (CONSOLIDATOR_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use consolidator::config::loader::load_config;
///
/// let config = load_config("consolidator.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<ConsolidatorConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConsolidatorError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        ConsolidatorError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text (substitution, overrides and validation included)
///
/// # Errors
///
/// Returns a `Configuration` error for missing variables, bad TOML or
/// invalid values.
pub fn parse_config(contents: &str) -> Result<ConsolidatorConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: ConsolidatorConfig = toml::from_str(&contents)
        .map_err(|e| ConsolidatorError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config)?;

    config.validate().map_err(|e| {
        ConsolidatorError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap_or_else(|e| unreachable!("{e}"))
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are left untouched. All missing variables are reported
/// together.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = env_var_pattern();
    let mut result = String::new();
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(ConsolidatorError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    value.parse().map_err(|_| {
        ConsolidatorError::Configuration(format!("{name} must be 'true' or 'false', got '{value}'"))
    })
}

/// Applies environment variable overrides using CONSOLIDATOR_* prefix
///
/// Environment variables follow the pattern: CONSOLIDATOR_<SECTION>_<KEY>
/// For example: CONSOLIDATOR_STORAGE_ROOT, CONSOLIDATOR_APPLICATION_DRY_RUN
fn apply_env_overrides(config: &mut ConsolidatorConfig) -> Result<()> {
    use std::env::var;

    // Application overrides
    if let Ok(val) = var("CONSOLIDATOR_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = var("CONSOLIDATOR_APPLICATION_DRY_RUN") {
        config.application.dry_run = parse_bool("CONSOLIDATOR_APPLICATION_DRY_RUN", &val)?;
    }

    // Storage overrides
    if let Ok(val) = var("CONSOLIDATOR_STORAGE_BACKEND") {
        config.storage.backend = match val.to_lowercase().as_str() {
            "local" => StorageBackendKind::Local,
            "memory" => StorageBackendKind::Memory,
            other => {
                return Err(ConsolidatorError::Configuration(format!(
                    "CONSOLIDATOR_STORAGE_BACKEND must be 'local' or 'memory', got '{other}'"
                )))
            }
        };
    }
    if let Ok(val) = var("CONSOLIDATOR_STORAGE_ROOT") {
        config.storage.root = val;
    }
    if let Ok(val) = var("CONSOLIDATOR_STORAGE_INPUT_PREFIX") {
        config.storage.input_prefix = val;
    }
    if let Ok(val) = var("CONSOLIDATOR_STORAGE_OUTPUT_PREFIX") {
        config.storage.output_prefix = val;
    }

    // Input/output overrides
    if let Ok(val) = var("CONSOLIDATOR_INPUT_HAS_HEADER") {
        config.input.has_header = parse_bool("CONSOLIDATOR_INPUT_HAS_HEADER", &val)?;
    }
    if let Ok(val) = var("CONSOLIDATOR_OUTPUT_WRITE_HEADER") {
        config.output.write_header = parse_bool("CONSOLIDATOR_OUTPUT_WRITE_HEADER", &val)?;
    }

    // Ledger overrides
    if let Ok(val) = var("CONSOLIDATOR_LEDGER_ENABLED") {
        config.ledger.enabled = parse_bool("CONSOLIDATOR_LEDGER_ENABLED", &val)?;
    }
    if let Ok(val) = var("CONSOLIDATOR_LEDGER_SKIP_PROCESSED") {
        config.ledger.skip_processed = parse_bool("CONSOLIDATOR_LEDGER_SKIP_PROCESSED", &val)?;
    }

    // Logging overrides
    if let Ok(val) = var("CONSOLIDATOR_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_bool("CONSOLIDATOR_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Ok(val) = var("CONSOLIDATOR_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
