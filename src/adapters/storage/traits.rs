//! Object storage abstraction traits
//!
//! This module defines the trait that storage adapters must implement to
//! hold input batches, the published file, staging artifacts and the ledger.

use crate::domain::Result;
use async_trait::async_trait;

/// Object storage trait
///
/// Keys are relative, `/`-separated paths under the storage root. Prefix
/// arguments are directory-style: `a/b` covers `a/b` itself and everything
/// under `a/b/`, but not `a/bc`.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Human-readable location of the storage root (for logs)
    fn describe(&self) -> String;

    /// Read an object
    ///
    /// # Returns
    ///
    /// Returns `Ok(None)` if the object does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the read fails.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write an object, creating or overwriting it
    ///
    /// No atomicity is promised: a reader may observe a partial object.
    /// Use [`ObjectStorage::replace`] to publish.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    async fn put(&self, key: &str, data: Vec<u8>) -> Result<()>;

    /// Atomically replace `target` with the content of `source`
    ///
    /// At every instant a reader of `target` observes either its old content
    /// or the full content of `source`. After success `source` may or may not
    /// still exist depending on the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is missing or the replace fails. On error
    /// `target` is unchanged.
    async fn replace(&self, source: &str, target: &str) -> Result<()>;

    /// Delete every object under `prefix`
    ///
    /// Succeeds even if nothing matches.
    ///
    /// # Returns
    ///
    /// Number of objects deleted.
    async fn delete_prefix(&self, prefix: &str) -> Result<usize>;

    /// List object keys under `prefix`, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check whether an object exists
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key).await?.is_some())
    }
}
