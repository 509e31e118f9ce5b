//! CLI module - Command-line interface for habitrack
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// habitrack - habit tracking backend
#[derive(Parser)]
#[command(name = "habitrack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a demo account with a month of sample habits and logs
    Seed,

    /// Run the habit reset sweep for one account
    Reset {
        /// Account email
        #[arg(long)]
        email: String,
    },
}

pub use commands::*;
