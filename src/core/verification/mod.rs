//! Verification of the published file
//!
//! Recomputes the SHA-256 of the published bytes and compares it with the
//! checksum recorded by the most recent completed batch in the ledger.

pub mod checksum;
pub mod report;
pub mod verify;

pub use checksum::checksum_bytes;
pub use report::{VerificationReport, VerificationStatus};
pub use verify::verify_published;
