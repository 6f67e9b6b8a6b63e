//! External system integrations for Consolidator.
//!
//! - [`storage`] - Object storage abstraction (trait-based) with local
//!   filesystem and in-memory backends
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies
//! and enable testing with in-memory or fault-injecting implementations.
//! Everything above this layer talks to [`storage::ObjectStorage`] only.
//!
//! ```rust,no_run
//! use consolidator::adapters::storage::{LocalFsStorage, ObjectStorage};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = LocalFsStorage::open("/var/lib/consolidator").await?;
//! let published = storage.get("des_file/final_output.csv").await?;
//! println!("published: {}", published.is_some());
//! # Ok(())
//! # }
//! ```

pub mod storage;
