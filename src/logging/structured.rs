//! Structured logging setup using tracing
//!
//! Console output always goes to stderr. A JSON file layer with rotation
//! can be enabled through `[logging]`; each run's classification, publish
//! and cleanup events then land there as one JSON object per line.
//!
//! # Example
//!
//! ```no_run
//! use consolidator::logging::init_logging;
//! use consolidator::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//! ```

use crate::config::LoggingConfig;
use crate::domain::{ConsolidatorError, Result};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// File name prefix of rotated log files under `logging.local_path`
pub const LOG_FILE_PREFIX: &str = "consolidator.log";

/// Keeps the non-blocking file writer alive; dropping it flushes pending lines
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber
///
/// `RUST_LOG` wins over `log_level_str`. Run events from this crate are
/// filtered at `log_level_str`; dependencies stay at `warn`.
///
/// # Errors
///
/// Returns a `Configuration` error for an unknown level, and when the log
/// directory cannot be created or a global subscriber is already set.
pub fn init_logging(log_level_str: &str, config: &LoggingConfig) -> Result<LoggingGuard> {
    let log_level = parse_log_level(log_level_str)?;
    let filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("warn,consolidator={log_level}")))
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer(filter())];
    let file_guard = match file_layer(config, filter())? {
        Some((layer, guard)) => {
            layers.push(layer);
            Some(guard)
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| {
            ConsolidatorError::Configuration(format!("Failed to install log subscriber: {e}"))
        })?;

    tracing::debug!(
        level = %log_level,
        file_logging = config.local_enabled,
        path = %config.local_path,
        rotation = %config.local_rotation,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

/// Human-readable events on stderr so stdout stays free for `--json` output
fn console_layer(filter: EnvFilter) -> BoxedLayer {
    tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter)
        .boxed()
}

/// JSON lines in a rotating file, one object per event
fn file_layer(
    config: &LoggingConfig,
    filter: EnvFilter,
) -> Result<Option<(BoxedLayer, WorkerGuard)>> {
    if !config.local_enabled {
        return Ok(None);
    }

    let dir = Path::new(&config.local_path);
    std::fs::create_dir_all(dir).map_err(|e| {
        ConsolidatorError::Configuration(format!(
            "Failed to create log directory {}: {e}",
            dir.display()
        ))
    })?;

    let appender =
        RollingFileAppender::new(parse_rotation(&config.local_rotation), dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();

    Ok(Some((layer, guard)))
}

/// Parse log level from string
pub(crate) fn parse_log_level(level_str: &str) -> Result<Level> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        other => Err(ConsolidatorError::Configuration(format!(
            "Invalid log level '{other}', expected trace, debug, info, warn or error"
        ))),
    }
}

fn parse_rotation(rotation: &str) -> Rotation {
    match rotation {
        "hourly" => Rotation::HOURLY,
        "never" => Rotation::NEVER,
        _ => Rotation::DAILY,
    }
}
