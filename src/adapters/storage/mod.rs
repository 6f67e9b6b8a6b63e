//! Storage abstraction layer
//!
//! This module provides a trait-based abstraction over the object store that
//! holds batches and the published file, with a local-filesystem and an
//! in-memory backend.

pub mod factory;
pub mod local;
pub mod memory;
pub mod traits;

pub use factory::create_storage;
pub use local::LocalFsStorage;
pub use memory::MemoryStorage;
pub use traits::ObjectStorage;

use crate::domain::{Result, StorageError};

/// Joins key segments with `/`, dropping empty segments and stray slashes
///
/// # Examples
///
/// ```
/// use consolidator::adapters::storage::join_key;
///
/// assert_eq!(join_key(&["des_file/", "final_output.csv"]), "des_file/final_output.csv");
/// assert_eq!(join_key(&["", "a", "/b/"]), "a/b");
/// ```
pub fn join_key(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim_matches('/'))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Splits and validates a key into its segments
///
/// Rejects empty keys, absolute keys, backslashes, and `.`/`..` segments.
pub(crate) fn key_segments(key: &str) -> Result<Vec<&str>> {
    if key.is_empty() || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(key.to_string()).into());
    }
    let segments: Vec<&str> = key.split('/').collect();
    if segments
        .iter()
        .any(|s| s.is_empty() || *s == "." || *s == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()).into());
    }
    Ok(segments)
}

/// True if `key` is `prefix` itself or lies under `prefix/`
pub(crate) fn key_under_prefix(key: &str, prefix: &str) -> bool {
    key == prefix
        || key
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_segments_valid() {
        assert_eq!(key_segments("a/b/c.csv").unwrap(), vec!["a", "b", "c.csv"]);
    }

    #[test]
    fn test_key_segments_invalid() {
        for key in ["", "/abs", "a//b", "a/../b", "./a", "a\\b", "a/"] {
            assert!(key_segments(key).is_err(), "{key} should be rejected");
        }
    }

    #[test]
    fn test_key_under_prefix() {
        assert!(key_under_prefix("a/b", "a/b"));
        assert!(key_under_prefix("a/b/c", "a/b"));
        assert!(!key_under_prefix("a/bc", "a/b"));
        assert!(!key_under_prefix("a", "a/b"));
    }
}
