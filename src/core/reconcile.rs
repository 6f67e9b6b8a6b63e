//! Reconciliation of a classified batch against the materialized state
//!
//! - Snapshot: the result is built from the batch alone; the current state is
//!   ignored. Duplicate keys resolve to the later row.
//! - Delta: operations are applied in file order to a copy of the current
//!   state. Insert and Update both upsert; Delete of an absent key is a no-op.
//!   A delta with no current state fails with `NoBaseState`.
//!
//! The current state is only ever borrowed. A failed reconciliation leaves
//! nothing behind.

use crate::domain::{Batch, ChangeOperation, ConsolidatorError, MaterializedState, Result};
use serde::{Deserialize, Serialize};

/// Counters describing how a batch was applied
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileStats {
    /// Rows in the batch
    pub rows: usize,

    /// Insert operations (delta) or records (snapshot)
    pub inserts: usize,

    /// Update operations
    pub updates: usize,

    /// Delete operations
    pub deletes: usize,

    /// Inserts that replaced an existing record
    pub inserts_overwriting: usize,

    /// Updates whose key was absent and were inserted
    pub updates_inserting: usize,

    /// Deletes whose key was absent
    pub deletes_missing: usize,

    /// Snapshot rows superseded by a later row with the same key
    pub duplicate_keys: usize,
}

/// New state together with the statistics of producing it
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The next materialized state
    pub state: MaterializedState,

    /// How the batch was applied
    pub stats: ReconcileStats,
}

/// Applies `batch` to `current` and returns the next materialized state
///
/// # Errors
///
/// Returns `NoBaseState` for a delta batch when `current` is `None`.
///
/// # Examples
///
/// ```
/// use consolidator::core::reconcile::reconcile;
/// use consolidator::domain::{Batch, ChangeOperation, MaterializedState, Record, RecordKey};
///
/// let current = MaterializedState::from_records(vec![
///     Record::new("1", ["Amy", "NYC"]),
///     Record::new("2", ["Bo", "LA"]),
/// ]);
/// let delta = Batch::Delta(vec![
///     ChangeOperation::Update(Record::new("1", ["Amy", "SF"])),
///     ChangeOperation::Delete(RecordKey::from("2")),
/// ]);
///
/// let next = reconcile(Some(&current), &delta).unwrap();
/// assert_eq!(next.len(), 1);
/// assert_eq!(next.get("1").unwrap().values, vec!["Amy", "SF"]);
/// ```
pub fn reconcile(current: Option<&MaterializedState>, batch: &Batch) -> Result<MaterializedState> {
    reconcile_with_stats(current, batch).map(|outcome| outcome.state)
}

/// Same as [`reconcile`] but also reports [`ReconcileStats`]
pub fn reconcile_with_stats(
    current: Option<&MaterializedState>,
    batch: &Batch,
) -> Result<ReconcileOutcome> {
    let mut stats = ReconcileStats {
        rows: batch.len(),
        ..ReconcileStats::default()
    };

    let state = match batch {
        Batch::Snapshot(records) => {
            if current.is_some() {
                tracing::debug!("Snapshot batch replaces the current state");
            }
            let mut next = MaterializedState::new();
            for record in records {
                stats.inserts += 1;
                if next.upsert(record.clone()).is_some() {
                    stats.duplicate_keys += 1;
                }
            }
            next
        }
        Batch::Delta(ops) => {
            let base = current.ok_or(ConsolidatorError::NoBaseState)?;
            let mut next = base.clone();
            for op in ops {
                apply_operation(&mut next, op, &mut stats);
            }
            next
        }
    };

    tracing::info!(
        kind = %batch.kind(),
        inserts = stats.inserts,
        updates = stats.updates,
        deletes = stats.deletes,
        records = state.len(),
        "Reconciled batch"
    );

    Ok(ReconcileOutcome { state, stats })
}

fn apply_operation(state: &mut MaterializedState, op: &ChangeOperation, stats: &mut ReconcileStats) {
    match op {
        ChangeOperation::Insert(record) => {
            stats.inserts += 1;
            if state.upsert(record.clone()).is_some() {
                stats.inserts_overwriting += 1;
            }
        }
        ChangeOperation::Update(record) => {
            stats.updates += 1;
            if state.upsert(record.clone()).is_none() {
                stats.updates_inserting += 1;
            }
        }
        ChangeOperation::Delete(key) => {
            stats.deletes += 1;
            if state.remove(key).is_none() {
                stats.deletes_missing += 1;
            }
        }
    }
}
