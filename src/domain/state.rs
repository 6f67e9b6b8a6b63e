//! Materialized table state
//!
//! The consolidated mapping from primary key to record. Values are never
//! mutated by callers outside the crate: the reconciler builds new values and
//! the materialization writer is the only component that persists them.

use super::ids::RecordKey;
use super::record::Record;
use std::collections::BTreeMap;

/// The table as of the latest processed batch
///
/// Holds at most one record per key. Iteration is in key order (see
/// [`RecordKey`]), which is also the published row order.
///
/// # Examples
///
/// ```
/// use consolidator::domain::record::Record;
/// use consolidator::domain::state::MaterializedState;
///
/// let state = MaterializedState::from_records(vec![
///     Record::new("2", ["Bo", "LA"]),
///     Record::new("1", ["Amy", "NYC"]),
///     Record::new("2", ["Bob", "SF"]),
/// ]);
///
/// assert_eq!(state.len(), 2);
/// assert_eq!(state.get("2").unwrap().values, vec!["Bob", "SF"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializedState {
    records: BTreeMap<RecordKey, Record>,
}

impl MaterializedState {
    /// Creates an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from records in order; later records win on duplicate keys
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut state = Self::new();
        for record in records {
            state.upsert(record);
        }
        state
    }

    /// Looks up a record by key
    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(&RecordKey::new(key))
    }

    /// True if a record exists for `key`
    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.records.contains_key(key)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if there are no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys in publish order
    pub fn keys(&self) -> impl Iterator<Item = &RecordKey> {
        self.records.keys()
    }

    /// Records in publish order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Inserts or replaces the record at its key, returning the previous one
    pub(crate) fn upsert(&mut self, record: Record) -> Option<Record> {
        self.records.insert(record.key.clone(), record)
    }

    /// Removes the record at `key`, returning it if present
    pub(crate) fn remove(&mut self, key: &RecordKey) -> Option<Record> {
        self.records.remove(key)
    }
}
