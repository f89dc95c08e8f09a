//! Command line argument parsing for the Annex CLI using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Annex - approximate nearest neighbor search over HNSW graphs
#[derive(Parser, Debug, Clone)]
#[command(name = "annex")]
#[command(about = "Approximate nearest neighbor search over HNSW graphs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct AnnexArgs {
    /// Verbosity level (repeat for more: -v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "json")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl AnnexArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }

    /// Default log filter for the effective verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbosity() {
            0 => "error",
            1 => "warn",
            2 => "info",
            _ => "debug",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build an index from a request's dataset and answer its queries
    Search(SearchArgs),

    /// Build an index from a request's dataset and show graph statistics
    Stats(StatsArgs),
}

/// Index parameters that override the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct IndexOverrides {
    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Maximum graph degree M
    #[arg(long)]
    pub m: Option<usize>,

    /// Build-time beam width
    #[arg(long)]
    pub ef_construction: Option<usize>,

    /// Query-time beam width
    #[arg(long)]
    pub ef: Option<usize>,

    /// Seed for layer assignment
    #[arg(long)]
    pub seed: Option<u64>,

    /// Distance reported for neighbors (squared_euclidean or euclidean)
    #[arg(long)]
    pub metric: Option<String>,

    /// Number of query worker threads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Abort the request after this many milliseconds
    #[arg(long, env = "ANNEX_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Request file (JSON with dataset, query and k)
    #[arg(value_name = "REQUEST_FILE")]
    pub request: PathBuf,

    /// Override the request's neighbor count
    #[arg(short, long)]
    pub k: Option<usize>,

    #[command(flatten)]
    pub overrides: IndexOverrides,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Request file (JSON); only the dataset is used
    #[arg(value_name = "REQUEST_FILE")]
    pub request: PathBuf,

    /// Check graph invariants after building
    #[arg(long)]
    pub validate: bool,

    #[command(flatten)]
    pub overrides: IndexOverrides,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
