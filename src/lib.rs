// Consolidator - Snapshot/Delta Table Consolidation Tool
// Copyright (c) 2025 Consolidator Contributors
// Licensed under the MIT License

//! # Consolidator - snapshot/delta table consolidation
//!
//! Consolidator maintains one published, fully materialized table from a
//! stream of delivered batches. Each batch is either a **snapshot** (the
//! whole table) or a **delta** (insert/update/delete operations), told apart
//! by column count alone.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Classification, reconciliation, publishing, ledger
//! - [`adapters`] - Object storage backends
//! - [`domain`] - Records, batches, state, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use consolidator::adapters::storage::create_storage;
//! use consolidator::config::load_config;
//! use consolidator::core::consolidate::ConsolidationCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("consolidator.toml")?;
//!     let storage = create_storage(&config.storage).await?;
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//!     let coordinator = ConsolidationCoordinator::new(config, storage, shutdown_rx)?;
//!     let summary = coordinator
//!         .process_batch(&"LOAD00000001.csv".parse()?, false)
//!         .await?;
//!
//!     println!("{} records published", summary.records_after);
//!     Ok(())
//! }
//! ```
//!
//! ## Reconciling in memory
//!
//! The reconciler is a pure function over [`domain::MaterializedState`]:
//!
//! ```rust
//! use consolidator::core::classify::classify;
//! use consolidator::core::reconcile::reconcile;
//! use consolidator::domain::{BatchId, RawBatch, TableSchema};
//!
//! # fn example() -> consolidator::domain::Result<()> {
//! let schema = TableSchema::person();
//! let row = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
//!
//! let snapshot = classify(&schema, RawBatch::new(
//!     BatchId::new("full.csv").unwrap(),
//!     vec![row(&["1", "Amy", "NYC"]), row(&["2", "Bo", "LA"])],
//! ))?;
//! let state = reconcile(None, &snapshot)?;
//!
//! let delta = classify(&schema, RawBatch::new(
//!     BatchId::new("changes.csv").unwrap(),
//!     vec![row(&["U", "1", "Amy", "SF"]), row(&["D", "2", "Bo", "LA"])],
//! ))?;
//! let state = reconcile(Some(&state), &delta)?;
//!
//! assert_eq!(state.len(), 1);
//! assert_eq!(state.get("1").unwrap().values, vec!["Amy", "SF"]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`] with [`domain::ConsolidatorError`].
//! Rejected batches never touch the published table; see
//! [`domain::ConsolidatorError::is_batch_rejection`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
