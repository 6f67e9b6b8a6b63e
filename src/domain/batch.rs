//! Batch models
//!
//! A [`RawBatch`] is the decoded row set of a delivered file; a [`Batch`] is
//! the same content after classification.

use super::ids::BatchId;
use super::record::{ChangeOperation, Record};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an input batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchKind {
    /// Full table state
    Snapshot,
    /// Change operations on top of existing state
    Delta,
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Snapshot => f.write_str("snapshot"),
            Self::Delta => f.write_str("delta"),
        }
    }
}

/// Decoded but unclassified input batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBatch {
    /// Batch identifier
    pub id: BatchId,

    /// Data rows in file order (header already removed)
    pub rows: Vec<Vec<String>>,
}

impl RawBatch {
    /// Creates a raw batch
    pub fn new(id: BatchId, rows: Vec<Vec<String>>) -> Self {
        Self { id, rows }
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the batch has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Classified, immutable input batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Batch {
    /// Complete desired table state, in file order
    Snapshot(Vec<Record>),
    /// Mutations to apply in file order
    Delta(Vec<ChangeOperation>),
}

impl Batch {
    /// Kind of this batch
    pub fn kind(&self) -> BatchKind {
        match self {
            Self::Snapshot(_) => BatchKind::Snapshot,
            Self::Delta(_) => BatchKind::Delta,
        }
    }

    /// Number of rows in the batch
    pub fn len(&self) -> usize {
        match self {
            Self::Snapshot(records) => records.len(),
            Self::Delta(ops) => ops.len(),
        }
    }

    /// True if the batch has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
