//! Checksum calculation for published files
//!
//! The checksum of the published bytes is recorded in the publish receipt
//! and the batch ledger, and recomputed by `status --verify`.

use sha2::{Digest, Sha256};

/// Calculate SHA-256 checksum of raw bytes
///
/// # Returns
///
/// Returns a hex-encoded SHA-256 checksum string (64 characters).
///
/// # Examples
///
/// ```
/// use consolidator::core::verification::checksum::checksum_bytes;
///
/// let checksum = checksum_bytes(b"PersonID,FullName,City\n");
/// assert_eq!(checksum.len(), 64);
/// ```
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_bytes_known_value() {
        assert_eq!(
            checksum_bytes(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_checksum_bytes_deterministic() {
        let data = b"1,Amy,NYC\n2,Bo,LA\n";
        assert_eq!(checksum_bytes(data), checksum_bytes(data));
        assert!(checksum_bytes(data).chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_checksum_bytes_different_content() {
        assert_ne!(checksum_bytes(b"1,Amy,NYC\n"), checksum_bytes(b"1,Amy,SF\n"));
    }
}
