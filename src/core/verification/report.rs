//! Verification report structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of verifying the published file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    /// Checksum matches the last completed ledger entry
    Passed,
    /// Checksum differs from the last completed ledger entry
    Mismatch,
    /// Nothing has been published yet
    NothingPublished,
    /// The ledger holds no completed entry to compare against
    NoReference,
}

/// Verification report for the published file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    /// When the verification was performed
    pub verified_at: DateTime<Utc>,

    /// Key of the published object
    pub published_key: String,

    /// Verification outcome
    pub status: VerificationStatus,

    /// Checksum recorded by the last completed batch
    pub expected_checksum: Option<String>,

    /// Checksum of the bytes currently published
    pub actual_checksum: Option<String>,

    /// Batch the expected checksum was taken from
    pub reference_batch: Option<String>,
}

impl VerificationReport {
    /// Check if verification did not find a mismatch
    pub fn is_success(&self) -> bool {
        self.status != VerificationStatus::Mismatch
    }

    /// Format the report as a human-readable string
    pub fn format_summary(&self) -> String {
        let mut summary = String::new();
        summary.push_str("📊 Verification Report\n");
        summary.push_str(&format!("  Verified at: {}\n", self.verified_at));
        summary.push_str(&format!("  Published file: {}\n", self.published_key));

        let status = match self.status {
            VerificationStatus::Passed => "✅ Checksum matches",
            VerificationStatus::Mismatch => "❌ Checksum mismatch",
            VerificationStatus::NothingPublished => "⏭️  Nothing published yet",
            VerificationStatus::NoReference => "⏭️  No completed batch to compare against",
        };
        summary.push_str(&format!("  Status: {status}\n"));

        if let Some(batch) = &self.reference_batch {
            summary.push_str(&format!("  Reference batch: {batch}\n"));
        }
        if let Some(expected) = &self.expected_checksum {
            summary.push_str(&format!("  Expected: {expected}\n"));
        }
        if let Some(actual) = &self.actual_checksum {
            summary.push_str(&format!("  Actual:   {actual}\n"));
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(status: VerificationStatus) -> VerificationReport {
        VerificationReport {
            verified_at: Utc::now(),
            published_key: "des_file/final_output.csv".to_string(),
            status,
            expected_checksum: Some("abc".to_string()),
            actual_checksum: Some("def".to_string()),
            reference_batch: Some("batch-1.csv".to_string()),
        }
    }

    #[test]
    fn test_is_success() {
        assert!(report(VerificationStatus::Passed).is_success());
        assert!(report(VerificationStatus::NothingPublished).is_success());
        assert!(!report(VerificationStatus::Mismatch).is_success());
    }

    #[test]
    fn test_format_summary_mentions_checksums() {
        let text = report(VerificationStatus::Mismatch).format_summary();
        assert!(text.contains("Checksum mismatch"));
        assert!(text.contains("Expected: abc"));
        assert!(text.contains("batch-1.csv"));
    }
}
