// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search command

use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use tracing::debug;

use super::open_engine;
use crate::cli::OutputFormat;
use scrip::config::Config;
use scrip::errors::suggestions;
use scrip::output::{print_json, print_ranked};

/// Run the search command
pub fn run(
    config: &Config,
    index_path: &Path,
    query: &str,
    limit: usize,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let engine = open_engine(config, index_path)?;

    let mut results = engine.search_ranked(query);
    debug!(query, total = results.len(), limit, "Search finished");
    results.truncate(limit);

    match format {
        OutputFormat::Json => print_json(&results, compact)?,
        OutputFormat::Text if results.is_empty() => {
            println!("{} {}", "✗".red(), suggestions::no_results_suggestion(query));
        }
        OutputFormat::Text => print_ranked(query, &results),
    }

    engine.close()?;
    Ok(())
}
