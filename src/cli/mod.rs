//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Consolidator using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Consolidator - snapshot/delta table consolidation
#[derive(Parser, Debug)]
#[command(name = "consolidator")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "consolidator.toml", env = "CONSOLIDATOR_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CONSOLIDATOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply one input batch to the published table
    Process(commands::process::ProcessArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the published table and the batch ledger
    Status(commands::status::StatusArgs),

    /// Remove staging directories left behind by earlier runs
    Cleanup(commands::cleanup::CleanupArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
