//! Record and change-operation models
//!
//! Cells are passed through as strings. Parsing only checks the structural
//! shape of a row (its width and, for deltas, the operation code).

use super::errors::ConsolidatorError;
use super::ids::RecordKey;
use super::result::Result;
use super::schema::TableSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One logical row of the tracked table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Primary-key value
    pub key: RecordKey,

    /// Value cells in schema order
    pub values: Vec<String>,
}

impl Record {
    /// Creates a record from a key and value cells
    pub fn new(key: impl Into<String>, values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            key: RecordKey::new(key),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a snapshot row (`key, values...`)
    ///
    /// # Arguments
    ///
    /// * `schema` - Table schema
    /// * `row` - 1-based data row number, used in errors
    /// * `cells` - Row cells
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the row is not exactly snapshot-width.
    pub fn from_cells(schema: &TableSchema, row: usize, cells: Vec<String>) -> Result<Self> {
        if cells.len() != schema.snapshot_width() {
            return Err(mismatch(schema, row, cells.len()));
        }

        let mut cells = cells.into_iter();
        let key = cells.next().unwrap_or_default();
        Ok(Self {
            key: RecordKey::new(key),
            values: cells.collect(),
        })
    }

    /// Serializes the record back into snapshot-ordered cells
    pub fn to_cells(&self) -> Vec<&str> {
        std::iter::once(self.key.as_str())
            .chain(self.values.iter().map(String::as_str))
            .collect()
    }
}

/// Kind of a change operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// `I`
    Insert,
    /// `U`
    Update,
    /// `D`
    Delete,
}

impl OpKind {
    /// The single-letter code used in delta files
    pub fn code(&self) -> &'static str {
        match self {
            Self::Insert => "I",
            Self::Update => "U",
            Self::Delete => "D",
        }
    }
}

impl FromStr for OpKind {
    type Err = String;

    /// Case-sensitive: only `I`, `U` and `D` are accepted.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::Insert),
            "U" => Ok(Self::Update),
            "D" => Ok(Self::Delete),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One mutation instruction from a delta batch
///
/// Insert and Update carry a complete replacement record; Delete carries
/// only the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeOperation {
    /// Add or overwrite the record at its key
    Insert(Record),
    /// Overwrite the record at its key (inserting it if absent)
    Update(Record),
    /// Remove the record at this key if present
    Delete(RecordKey),
}

impl ChangeOperation {
    /// Parses a delta row (`op, key, values...`)
    ///
    /// Value cells on a `D` row are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the row is not exactly delta-width and
    /// `UnrecognizedOperation` if the leading cell is not `I`, `U` or `D`.
    pub fn from_cells(schema: &TableSchema, row: usize, cells: Vec<String>) -> Result<Self> {
        if cells.len() != schema.delta_width() {
            return Err(mismatch(schema, row, cells.len()));
        }

        let mut cells = cells.into_iter();
        let code = cells.next().unwrap_or_default();
        let kind = code
            .parse::<OpKind>()
            .map_err(|code| ConsolidatorError::UnrecognizedOperation { row, code })?;
        let key = cells.next().unwrap_or_default();

        Ok(match kind {
            OpKind::Insert => Self::Insert(Record {
                key: RecordKey::new(key),
                values: cells.collect(),
            }),
            OpKind::Update => Self::Update(Record {
                key: RecordKey::new(key),
                values: cells.collect(),
            }),
            OpKind::Delete => Self::Delete(RecordKey::new(key)),
        })
    }

    /// Operation kind
    pub fn kind(&self) -> OpKind {
        match self {
            Self::Insert(_) => OpKind::Insert,
            Self::Update(_) => OpKind::Update,
            Self::Delete(_) => OpKind::Delete,
        }
    }

    /// Target key
    pub fn key(&self) -> &RecordKey {
        match self {
            Self::Insert(record) | Self::Update(record) => &record.key,
            Self::Delete(key) => key,
        }
    }
}

fn mismatch(schema: &TableSchema, row: usize, found: usize) -> ConsolidatorError {
    ConsolidatorError::SchemaMismatch {
        row,
        found,
        snapshot_width: schema.snapshot_width(),
        delta_width: schema.delta_width(),
    }
}
