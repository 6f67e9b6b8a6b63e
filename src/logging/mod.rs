//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - Console output for operators
//! - Optional JSON log files with rotation
//! - Run-level macros shared by the coordinator and the CLI
//!
//! # Example
//!
//! ```no_run
//! use consolidator::logging::init_logging;
//! use consolidator::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of a consolidation run
///
/// # Example
///
/// ```no_run
/// use consolidator::log_run_start;
/// use consolidator::domain::{BatchId, RunId};
///
/// let batch_id: BatchId = "LOAD00000001.csv".parse().unwrap();
/// let run_id = RunId::generate(chrono::Utc::now());
/// log_run_start!(&run_id, &batch_id);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($run_id:expr, $batch_id:expr) => {
        tracing::info!(
            run_id = %$run_id,
            batch_id = %$batch_id,
            "Starting consolidation run"
        );
    };
}

/// Log the completion of a consolidation run
///
/// # Example
///
/// ```no_run
/// use consolidator::log_run_complete;
/// use std::time::Duration;
///
/// log_run_complete!("20250101_000000_ab12cd34", 42, Duration::from_millis(350));
/// ```
#[macro_export]
macro_rules! log_run_complete {
    ($run_id:expr, $records:expr, $duration:expr) => {
        tracing::info!(
            run_id = %$run_id,
            records = $records,
            duration_ms = $duration.as_millis() as u64,
            "Consolidation run completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use consolidator::log_error_with_context;
/// use consolidator::domain::ConsolidatorError;
///
/// let error = ConsolidatorError::NoBaseState;
/// log_error_with_context!(&error, "Failed to apply delta");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
