//! Run summary and reporting
//!
//! This module defines the structure returned by one consolidation run.

use crate::core::publish::PublishReceipt;
use crate::core::reconcile::ReconcileStats;
use crate::domain::BatchKind;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// The new state was published
    Published,
    /// The batch was reconciled but nothing was written
    DryRun,
    /// The ledger shows the batch was already published
    Skipped,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Published => f.write_str("published"),
            Self::DryRun => f.write_str("dry run"),
            Self::Skipped => f.write_str("skipped"),
        }
    }
}

/// Summary of a consolidation run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: String,

    /// Input batch identifier
    pub batch_id: String,

    /// Classified batch kind (None when skipped)
    pub kind: Option<BatchKind>,

    /// How the run ended
    pub outcome: RunOutcome,

    /// Data rows read from the batch
    pub rows_read: usize,

    /// Reconciliation counters
    pub stats: ReconcileStats,

    /// Records in the state the delta was applied to
    pub records_before: Option<usize>,

    /// Records in the resulting state
    pub records_after: usize,

    /// Publish receipt (None for dry runs and skipped batches)
    pub receipt: Option<PublishReceipt>,

    /// Duration of the run
    #[serde(with = "duration_millis")]
    pub duration: Duration,

    /// Non-fatal problems (leaked staging, ledger write failures)
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// Create a summary for a run that has not processed anything yet
    pub fn new(run_id: impl Into<String>, batch_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            batch_id: batch_id.into(),
            kind: None,
            outcome: RunOutcome::Skipped,
            rows_read: 0,
            stats: ReconcileStats::default(),
            records_before: None,
            records_after: 0,
            receipt: None,
            duration: Duration::from_secs(0),
            warnings: Vec::new(),
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Add a non-fatal warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Check if the run finished without warnings
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            run_id = %self.run_id,
            batch_id = %self.batch_id,
            kind = ?self.kind,
            outcome = %self.outcome,
            rows_read = self.rows_read,
            inserts = self.stats.inserts,
            updates = self.stats.updates,
            deletes = self.stats.deletes,
            records_before = ?self.records_before,
            records_after = self.records_after,
            duration_ms = self.duration.as_millis() as u64,
            "Run summary"
        );

        for warning in &self.warnings {
            tracing::warn!(run_id = %self.run_id, warning = %warning, "Run warning");
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}
