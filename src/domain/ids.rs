//! Domain identifier types with validation
//!
//! This module provides newtype wrappers for batch, run and record identifiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Input batch identifier newtype wrapper
///
/// The name of a delivered batch file under the configured input prefix.
/// It is a single path segment: it may not contain `/`, `\` or be `.`/`..`.
///
/// # Examples
///
/// ```
/// use consolidator::domain::ids::BatchId;
/// use std::str::FromStr;
///
/// let batch_id = BatchId::from_str("LOAD00000001.csv").unwrap();
/// assert_eq!(batch_id.as_str(), "LOAD00000001.csv");
/// assert!(BatchId::from_str("../escape.csv").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BatchId(String);

impl BatchId {
    /// Creates a new BatchId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(BatchId)` if the ID is a valid single path segment, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Batch ID cannot be empty".to_string());
        }
        if id.contains('/') || id.contains('\\') {
            return Err(format!("Batch ID must not contain path separators: {id}"));
        }
        if id == "." || id == ".." {
            return Err(format!("Batch ID is not a valid file name: {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the batch ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BatchId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Run identifier
///
/// Format: `{YYYYMMDD_HHMMSS}_{8 hex chars}`. The timestamp keeps staging
/// names sortable, the random suffix keeps concurrent runs from colliding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(String);

impl RunId {
    /// Generates a run ID for a run starting at `started_at`
    pub fn generate(started_at: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}_{}",
            started_at.format("%Y%m%d_%H%M%S"),
            &suffix[..8]
        ))
    }

    /// Returns the run ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Primary-key value of a record
///
/// Keys are stored as the raw cell text. Ordering is numeric when both keys
/// parse as integers and lexicographic otherwise, with the raw text as a
/// tie-break so that `Ord` stays consistent with `Eq` (`"01"` != `"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordKey(String);

impl RecordKey {
    /// Creates a key from a cell value
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_integer(&self) -> Option<i64> {
        self.0.trim().parse().ok()
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_batch_id_valid() {
        let id = BatchId::new("LOAD00000001.csv").unwrap();
        assert_eq!(id.as_str(), "LOAD00000001.csv");
        assert_eq!(id.to_string(), "LOAD00000001.csv");
    }

    #[test]
    fn test_batch_id_rejects_empty_and_paths() {
        assert!(BatchId::new("").is_err());
        assert!(BatchId::new("   ").is_err());
        assert!(BatchId::new("a/b.csv").is_err());
        assert!(BatchId::new("a\\b.csv").is_err());
        assert!(BatchId::new("..").is_err());
    }

    #[test]
    fn test_run_id_format() {
        let started = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let run_id = RunId::generate(started);
        assert!(run_id.as_str().starts_with("20250304_050607_"));
        assert_eq!(run_id.as_str().len(), "20250304_050607_".len() + 8);
    }

    #[test]
    fn test_run_ids_are_unique() {
        let started = Utc::now();
        assert_ne!(RunId::generate(started), RunId::generate(started));
    }

    #[test]
    fn test_record_key_numeric_ordering() {
        let mut keys: Vec<RecordKey> = ["10", "2", "1"].iter().map(|k| RecordKey::from(*k)).collect();
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(RecordKey::as_str).collect();
        assert_eq!(ordered, vec!["1", "2", "10"]);
    }

    #[test]
    fn test_record_key_mixed_ordering() {
        let mut keys: Vec<RecordKey> = ["b", "3", "a"].iter().map(|k| RecordKey::from(*k)).collect();
        keys.sort();
        let ordered: Vec<&str> = keys.iter().map(RecordKey::as_str).collect();
        assert_eq!(ordered, vec!["3", "a", "b"]);
    }

    #[test]
    fn test_record_key_ord_consistent_with_eq() {
        let a = RecordKey::from("01");
        let b = RecordKey::from("1");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }
}
