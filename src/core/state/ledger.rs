//! Processed-batch ledger model
//!
//! The ledger records, per input batch, which run consumed it and what was
//! published. It lets the coordinator skip batches that were already
//! applied, so re-delivering an old snapshot cannot silently revert later
//! deltas. A batch only counts as applied when its input checksum matches;
//! the same name with rewritten content is processed again.

use crate::domain::{BatchId, BatchKind, RunId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Processing status of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    /// A run started on this batch and has not finished
    InProgress,
    /// The batch was published
    Completed,
    /// The last run on this batch failed
    Failed,
}

/// Ledger entry for one input batch
///
/// # Examples
///
/// ```
/// use consolidator::core::state::{BatchEntry, LedgerStatus};
/// use consolidator::domain::{BatchId, RunId};
///
/// let batch_id: BatchId = "part-0001.csv".parse().unwrap();
/// let mut entry = BatchEntry::new(&batch_id, &RunId::generate(chrono::Utc::now()));
/// assert_eq!(entry.status, LedgerStatus::InProgress);
///
/// entry.mark_failed("boom");
/// assert!(entry.is_failed());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Input batch identifier
    pub batch_id: String,

    /// Run that last touched this batch
    pub run_id: String,

    /// Classified kind (unknown until classification succeeds)
    pub kind: Option<BatchKind>,

    /// Status of the last run on this batch
    pub status: LedgerStatus,

    /// Data rows read from the batch
    pub rows_read: usize,

    /// Records in the published state
    pub records_published: usize,

    /// SHA-256 of the input batch bytes the run consumed
    #[serde(default)]
    pub input_checksum: Option<String>,

    /// SHA-256 of the published bytes
    pub checksum: Option<String>,

    /// When the last run started
    pub started_at: DateTime<Utc>,

    /// When the last run finished (None while in progress)
    pub completed_at: Option<DateTime<Utc>>,

    /// Failure message of the last run
    pub error: Option<String>,
}

impl BatchEntry {
    /// Create an in-progress entry for a run starting now
    pub fn new(batch_id: &BatchId, run_id: &RunId) -> Self {
        Self {
            batch_id: batch_id.to_string(),
            run_id: run_id.to_string(),
            kind: None,
            status: LedgerStatus::InProgress,
            rows_read: 0,
            records_published: 0,
            input_checksum: None,
            checksum: None,
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    /// Attach the checksum of the input bytes this run read
    pub fn with_input_checksum(mut self, input_checksum: Option<String>) -> Self {
        self.input_checksum = input_checksum;
        self
    }

    /// Check if this entry published exactly the input with `input_checksum`
    ///
    /// Entries written without an input checksum never match.
    pub fn published_input(&self, input_checksum: &str) -> bool {
        self.is_completed() && self.input_checksum.as_deref() == Some(input_checksum)
    }

    /// Check if the batch was published
    pub fn is_completed(&self) -> bool {
        self.status == LedgerStatus::Completed
    }

    /// Check if the last run failed
    pub fn is_failed(&self) -> bool {
        self.status == LedgerStatus::Failed
    }

    /// Duration of the last run if it finished
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.completed_at
            .map(|completed| completed - self.started_at)
    }

    /// Mark the batch as published
    pub fn mark_completed(
        &mut self,
        kind: BatchKind,
        rows_read: usize,
        records_published: usize,
        checksum: String,
    ) {
        self.kind = Some(kind);
        self.rows_read = rows_read;
        self.records_published = records_published;
        self.checksum = Some(checksum);
        self.error = None;
        self.completed_at = Some(Utc::now());
        self.status = LedgerStatus::Completed;
    }

    /// Mark the run as failed
    pub fn mark_failed(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        self.status = LedgerStatus::Failed;
    }
}

/// The ledger document, keyed by batch ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchLedger {
    /// Entries by batch ID
    #[serde(default)]
    pub entries: BTreeMap<String, BatchEntry>,

    /// Last time the ledger was written
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl BatchLedger {
    /// Entry for a batch, if any
    pub fn get(&self, batch_id: &BatchId) -> Option<&BatchEntry> {
        self.entries.get(batch_id.as_str())
    }

    /// Check if a batch has already been published
    pub fn is_completed(&self, batch_id: &BatchId) -> bool {
        self.get(batch_id).is_some_and(BatchEntry::is_completed)
    }

    /// Insert or replace the entry for its batch
    pub fn record(&mut self, entry: BatchEntry) {
        self.entries.insert(entry.batch_id.clone(), entry);
    }

    /// The most recently completed entry, i.e. the one that produced the
    /// currently published file
    pub fn latest_completed(&self) -> Option<&BatchEntry> {
        self.entries
            .values()
            .filter(|e| e.is_completed())
            .max_by_key(|e| e.completed_at)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the ledger has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn batch(id: &str) -> BatchId {
        id.parse().unwrap()
    }

    fn run() -> RunId {
        RunId::generate(Utc::now())
    }

    #[test]
    fn test_new_entry_is_in_progress() {
        let entry = BatchEntry::new(&batch("b1.csv"), &run());
        assert_eq!(entry.status, LedgerStatus::InProgress);
        assert!(entry.completed_at.is_none());
        assert!(entry.duration().is_none());
    }

    #[test]
    fn test_mark_completed() {
        let mut entry = BatchEntry::new(&batch("b1.csv"), &run());
        entry.mark_failed("first try");
        entry.mark_completed(BatchKind::Snapshot, 2, 2, "abc".to_string());

        assert!(entry.is_completed());
        assert_eq!(entry.kind, Some(BatchKind::Snapshot));
        assert_eq!(entry.checksum.as_deref(), Some("abc"));
        assert!(entry.error.is_none());
        assert!(entry.duration().is_some());
    }

    #[test]
    fn test_published_input_compares_input_checksum() {
        let mut entry =
            BatchEntry::new(&batch("b1.csv"), &run()).with_input_checksum(Some("in-1".to_string()));
        assert!(!entry.published_input("in-1"));

        entry.mark_completed(BatchKind::Snapshot, 1, 1, "out".to_string());
        assert!(entry.published_input("in-1"));
        assert!(!entry.published_input("in-2"));

        entry.input_checksum = None;
        assert!(!entry.published_input("in-1"));
    }

    #[test]
    fn test_entry_without_input_checksum_still_parses() {
        let mut entry = BatchEntry::new(&batch("b1.csv"), &run());
        entry.mark_completed(BatchKind::Delta, 1, 1, "out".to_string());
        let mut json = serde_json::to_value(&entry).unwrap();
        json.as_object_mut().unwrap().remove("input_checksum");

        let parsed: BatchEntry = serde_json::from_value(json).unwrap();
        assert!(parsed.input_checksum.is_none());
        assert!(parsed.is_completed());
    }

    #[test]
    fn test_ledger_is_completed() {
        let mut ledger = BatchLedger::default();
        let mut done = BatchEntry::new(&batch("b1.csv"), &run());
        done.mark_completed(BatchKind::Snapshot, 1, 1, "x".to_string());
        let mut failed = BatchEntry::new(&batch("b2.csv"), &run());
        failed.mark_failed("nope");

        ledger.record(done);
        ledger.record(failed);

        assert!(ledger.is_completed(&batch("b1.csv")));
        assert!(!ledger.is_completed(&batch("b2.csv")));
        assert!(!ledger.is_completed(&batch("b3.csv")));
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_latest_completed() {
        let mut ledger = BatchLedger::default();

        let mut older = BatchEntry::new(&batch("b1.csv"), &run());
        older.mark_completed(BatchKind::Snapshot, 1, 1, "old".to_string());
        older.completed_at = Some(Utc::now() - Duration::hours(1));

        let mut newer = BatchEntry::new(&batch("b2.csv"), &run());
        newer.mark_completed(BatchKind::Delta, 1, 1, "new".to_string());

        let mut failed = BatchEntry::new(&batch("b3.csv"), &run());
        failed.mark_failed("later failure");

        ledger.record(older);
        ledger.record(newer);
        ledger.record(failed);

        assert_eq!(
            ledger.latest_completed().and_then(|e| e.checksum.as_deref()),
            Some("new")
        );
    }

    #[test]
    fn test_ledger_json_shape() {
        let mut ledger = BatchLedger::default();
        ledger.record(BatchEntry::new(&batch("b1.csv"), &run()));

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["entries"]["b1.csv"]["status"], "in_progress");

        let parsed: BatchLedger = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ledger);
    }
}
