//! Consolidation orchestration
//!
//! - [`coordinator`] - Runs one input batch end to end
//! - [`summary`] - What a run did

pub mod coordinator;
pub mod summary;

pub use coordinator::ConsolidationCoordinator;
pub use summary::{RunOutcome, RunSummary};
