// SPDX-License-Identifier: MIT OR Apache-2.0

//! CLI argument parsing using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// scrip - Ranked instrument lookup
///
/// Searches an exchange catalog by symbol, name, brand or sector, ranking
/// matches by BM25 relevance blended with popularity.
#[derive(Parser, Debug)]
#[command(name = "scrip")]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Quickstart:\n  scrip index\n  scrip s \"tata consultancy\"\n  scrip search \"top banking stocks\"\n  scrip get RELIANCE --exchange NSE"
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Compact JSON output (no pretty formatting)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Index location (defaults to .scrip/index)
    #[arg(long, global = true, value_name = "PATH")]
    pub index: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the catalog index from the configured source files
    Index {
        /// Rebuild even if an index already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Ranked search by symbol, name, brand, tag or sector
    #[command(visible_aliases = ["s"])]
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short = 'm', long = "limit")]
        limit: Option<usize>,
    },

    /// Look up one instrument by symbol
    Get {
        /// Ticker symbol (case-insensitive)
        symbol: String,

        /// Preferred exchange; falls back to any listing when unmatched
        #[arg(short, long)]
        exchange: Option<String>,
    },

    /// List configured sectors and their members
    Sectors,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
