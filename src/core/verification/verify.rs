//! Verification of the published file against the ledger

use super::checksum::checksum_bytes;
use super::report::{VerificationReport, VerificationStatus};
use crate::core::publish::MaterializationWriter;
use crate::core::state::BatchLedger;
use crate::domain::Result;
use chrono::Utc;

/// Verify the published file
///
/// Recomputes the checksum of the bytes currently published and compares it
/// with the checksum recorded by the most recently completed batch.
///
/// # Errors
///
/// Returns an error if the published file cannot be read.
pub async fn verify_published(
    writer: &MaterializationWriter,
    ledger: &BatchLedger,
) -> Result<VerificationReport> {
    let published_key = writer.published_key();
    let actual_checksum = writer
        .read_published()
        .await?
        .map(|bytes| checksum_bytes(&bytes));
    let reference = ledger.latest_completed();
    let expected_checksum = reference.and_then(|e| e.checksum.clone());

    let status = match (&actual_checksum, &expected_checksum) {
        (None, _) => VerificationStatus::NothingPublished,
        (Some(_), None) => VerificationStatus::NoReference,
        (Some(actual), Some(expected)) if actual == expected => VerificationStatus::Passed,
        (Some(_), Some(_)) => VerificationStatus::Mismatch,
    };

    match status {
        VerificationStatus::Mismatch => tracing::warn!(
            published = %published_key,
            expected = ?expected_checksum,
            actual = ?actual_checksum,
            "Published file does not match the ledger"
        ),
        _ => tracing::info!(published = %published_key, status = ?status, "Verification finished"),
    }

    Ok(VerificationReport {
        verified_at: Utc::now(),
        published_key,
        status,
        expected_checksum,
        actual_checksum,
        reference_batch: reference.map(|e| e.batch_id.clone()),
    })
}
