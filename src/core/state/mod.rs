//! Processed-batch ledger
//!
//! Tracks which input batches have been applied to the published state.

pub mod ledger;
pub mod manager;

pub use ledger::{BatchEntry, BatchLedger, LedgerStatus};
pub use manager::LedgerManager;
