//! Domain error types
//!
//! This module defines the error hierarchy for Consolidator. Batch rejection
//! errors are raised before any published state is touched; only
//! [`ConsolidatorError::PublishFailure`] and [`ConsolidatorError::CleanupFailure`]
//! can occur once the publish step has begun.

use thiserror::Error;

/// Main Consolidator error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum ConsolidatorError {
    /// The batch's column width does not match any known row shape
    #[error(
        "Schema mismatch at row {row}: found {found} columns, expected {snapshot_width} (snapshot) or {delta_width} (delta)"
    )]
    SchemaMismatch {
        /// 1-based data row where the mismatch was detected (0 for an empty batch)
        row: usize,
        /// Number of cells found
        found: usize,
        /// Width of a snapshot row for the configured table
        snapshot_width: usize,
        /// Width of a delta row for the configured table
        delta_width: usize,
    },

    /// A delta row carries an operation code other than I, U or D
    #[error("Unrecognized operation code '{code}' at row {row}")]
    UnrecognizedOperation {
        /// 1-based data row
        row: usize,
        /// The offending code
        code: String,
    },

    /// A delta batch arrived before any snapshot was ever published
    #[error("No base state: a delta batch cannot be applied before a snapshot has been published")]
    NoBaseState,

    /// The atomic replace of the published object failed
    #[error("Publish failed: {0}")]
    PublishFailure(String),

    /// Staging artifacts could not be removed after a successful publish
    #[error("Cleanup failed: {0}")]
    CleanupFailure(String),

    /// The input batch does not exist in storage
    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    /// Storage collaborator errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// The run was cancelled before the publish step
    #[error("Run cancelled before publish")]
    Cancelled,

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl ConsolidatorError {
    /// Returns true if the error rejected the input batch itself
    ///
    /// Rejected batches never touch published state.
    pub fn is_batch_rejection(&self) -> bool {
        matches!(
            self,
            Self::SchemaMismatch { .. }
                | Self::UnrecognizedOperation { .. }
                | Self::NoBaseState
                | Self::BatchNotFound(_)
                | Self::Validation(_)
        )
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            e if e.is_batch_rejection() => 3,
            Self::Configuration(_) => 2,
            Self::Storage(_) | Self::Io(_) => 4,
            Self::Cancelled => 130,
            _ => 5,
        }
    }
}

/// Storage collaborator errors
///
/// These errors don't expose the underlying I/O or SDK types.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Object key is not acceptable for the backend
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Failed to read an object
    #[error("Failed to read object: {0}")]
    ReadFailed(String),

    /// Failed to write an object
    #[error("Failed to write object: {0}")]
    WriteFailed(String),

    /// Failed to atomically replace an object
    #[error("Failed to replace object: {0}")]
    ReplaceFailed(String),

    /// Failed to delete objects
    #[error("Failed to delete objects: {0}")]
    DeleteFailed(String),

    /// Failed to list objects
    #[error("Failed to list objects: {0}")]
    ListFailed(String),

    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for ConsolidatorError {
    fn from(err: std::io::Error) -> Self {
        ConsolidatorError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ConsolidatorError {
    fn from(err: serde_json::Error) -> Self {
        ConsolidatorError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ConsolidatorError {
    fn from(err: toml::de::Error) -> Self {
        ConsolidatorError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from delimited-text errors
impl From<csv::Error> for ConsolidatorError {
    fn from(err: csv::Error) -> Self {
        ConsolidatorError::Serialization(format!("Delimited text error: {err}"))
    }
}
