//! CLI commands and argument parsing.

pub mod check;
pub mod describe;
pub mod log;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tessera_core::{CatalogData, CatalogIndex};

/// Tessera - catalog-driven audit event logging
#[derive(Parser)]
#[command(name = "tessera")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Load a catalog and report what it defines
    Check(check::CheckArgs),

    /// Show the attributes and context keys of one event
    Describe(describe::DescribeArgs),

    /// Validate an event against a catalog and log it
    Log(log::LogArgs),

    /// Print version information
    Version,
}

/// Reads and builds a catalog file.
pub fn load_catalog(path: &Path, max_key_length: usize) -> Result<CatalogIndex> {
    let data = CatalogData::from_path(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    CatalogIndex::builder()
        .max_key_length(max_key_length)
        .build(data)
        .with_context(|| format!("Invalid catalog {}", path.display()))
}
