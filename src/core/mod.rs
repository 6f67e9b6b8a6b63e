//! Core business logic for Consolidator.
//!
//! # Modules
//!
//! - [`codec`] - Delimited-text decoding of batches and encoding of state
//! - [`classify`] - Snapshot/delta detection by row width
//! - [`reconcile`] - Applies a classified batch to the materialized state
//! - [`publish`] - Stage, atomic replace, clean up
//! - [`state`] - Processed-batch ledger
//! - [`verification`] - Checksums of the published file
//! - [`consolidate`] - Orchestration of one run
//!
//! # Run Workflow
//!
//! 1. **Read**: Fetch `{input_prefix}/{batch_id}` from storage
//! 2. **Classify**: Decide snapshot or delta from the first row's width
//! 3. **Load**: For a delta, decode the currently published file
//! 4. **Reconcile**: Build the next state
//! 5. **Publish**: Stage, then atomically replace the published file
//! 6. **Record**: Mark the batch completed in the ledger
//!
//! # Example
//!
//! ```rust,no_run
//! use consolidator::adapters::storage::create_storage;
//! use consolidator::config::load_config;
//! use consolidator::core::consolidate::ConsolidationCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("consolidator.toml")?;
//! let storage = create_storage(&config.storage).await?;
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! let coordinator = ConsolidationCoordinator::new(config, storage, shutdown_rx)?;
//! let summary = coordinator
//!     .process_batch(&"LOAD00000001.csv".parse()?, false)
//!     .await?;
//!
//! println!("Records: {}", summary.records_after);
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod codec;
pub mod consolidate;
pub mod publish;
pub mod reconcile;
pub mod state;
pub mod verification;
