use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "searchdata-mcp", version)]
#[command(about = "Query generated documentation search indexes", long_about = None)]
pub struct Cli {
    /// Directory holding the generated search shards
    #[arg(short, long, global = true, env = "SEARCHDATA_DIR")]
    pub dir: Option<PathBuf>,

    /// Settings file (defaults to ./searchdata.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Always parse shards, ignoring and not writing snapshots
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List entries whose key starts with PREFIX
    Lookup {
        prefix: String,
        /// Only entries from shards of this category (functions, classes, ...)
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Show the entry with exactly this key
    Get { key: String },
    /// Summary counts for the loaded index
    Stats,
    /// Load every shard and report failures
    Check,
    /// Serve the index over MCP on stdio
    Serve,
}
