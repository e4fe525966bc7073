//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "weld")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Inspect the component directives declared in rendered markup")]
pub struct Cli {
    /// Configuration file (TOML, JSON or YAML). `WELD__*` variables override it.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log level for diagnostics on stderr; overrides the configured level.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the directives each page would dispatch, plus per-source failures
    Scan {
        /// Markup files to scan
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Exit with a non-zero status when any directive source is malformed
        #[arg(long)]
        strict: bool,
        /// Print a JSON document instead of text
        #[arg(long)]
        json: bool,
    },
}
