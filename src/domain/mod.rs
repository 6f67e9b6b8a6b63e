//! Domain models and types for Consolidator.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Record model** ([`Record`], [`ChangeOperation`], [`OpKind`]) parsed against a [`TableSchema`]
//! - **Batches** ([`RawBatch`], [`Batch`], [`BatchKind`])
//! - **Materialized state** ([`MaterializedState`])
//! - **Identifiers** ([`BatchId`], [`RunId`], [`RecordKey`])
//! - **Error types** ([`ConsolidatorError`], [`StorageError`]) and the [`Result`] alias
//!
//! # Parsing rows
//!
//! ```rust
//! use consolidator::domain::{ChangeOperation, OpKind, TableSchema};
//!
//! # fn example() -> consolidator::domain::Result<()> {
//! let schema = TableSchema::person();
//! let cells = vec!["U".to_string(), "1".to_string(), "Amy".to_string(), "SF".to_string()];
//! let op = ChangeOperation::from_cells(&schema, 1, cells)?;
//! assert_eq!(op.kind(), OpKind::Update);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod errors;
pub mod ids;
pub mod record;
pub mod result;
pub mod schema;
pub mod state;

// Re-export commonly used types for convenience
pub use batch::{Batch, BatchKind, RawBatch};
pub use errors::{ConsolidatorError, StorageError};
pub use ids::{BatchId, RecordKey, RunId};
pub use record::{ChangeOperation, OpKind, Record};
pub use result::Result;
pub use schema::TableSchema;
pub use state::MaterializedState;
