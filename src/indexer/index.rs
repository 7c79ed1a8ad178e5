// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index command - loads the catalog sources and writes the tantivy store

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::info;

use crate::cli::OutputFormat;
use scrip::catalog::CatalogLoader;
use scrip::config::Config;
use scrip::output::print_json;
use scrip::store::TantivyStore;
use scrip::StockSearch;

#[derive(Debug, Serialize)]
struct IndexSummary {
    path: String,
    instruments: usize,
    documents: u64,
    rebuilt: bool,
    elapsed_ms: u128,
}

/// Run the index command
pub fn run(
    config: &Config,
    index_path: &Path,
    force: bool,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let files = config.catalog_files();
    if files.has_no_sources() {
        bail!(
            "No catalog sources configured.\n\n\
             Add a [catalog] section to .scriprc.toml:\n\
             [catalog]\n\
             curated = \"data/stocks.csv\"\n\
             nse = \"data/nse_equity.csv\""
        );
    }

    let exists = TantivyStore::exists(index_path);
    if exists && !force {
        match format {
            OutputFormat::Json => print_json(
                &serde_json::json!({ "path": index_path.display().to_string(), "skipped": true }),
                compact,
            )?,
            OutputFormat::Text => println!(
                "{} Index already exists at {} (use --force to rebuild)",
                "✓".green(),
                index_path.display().to_string().cyan()
            ),
        }
        return Ok(());
    }
    if exists {
        info!(path = %index_path.display(), "Removing existing index");
        std::fs::remove_dir_all(index_path)
            .with_context(|| format!("Failed to remove index at {}", index_path.display()))?;
    }

    let started = Instant::now();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(100));

    spinner.set_message("Loading catalog sources...");
    let resolver = config.resolver()?;
    let loader = CatalogLoader::new(config.popularity_tiers());
    let instruments = loader
        .load(&files, resolver.table())
        .context("Failed to load catalog sources")?;

    spinner.set_message(format!("Indexing {} instruments...", instruments.len()));
    let engine = StockSearch::open(index_path, &instruments, resolver)
        .with_context(|| format!("Failed to build index at {}", index_path.display()))?;
    let documents = engine.num_docs();
    engine.close()?;
    spinner.finish_and_clear();

    let summary = IndexSummary {
        path: index_path.display().to_string(),
        instruments: instruments.len(),
        documents,
        rebuilt: exists,
        elapsed_ms: started.elapsed().as_millis(),
    };

    match format {
        OutputFormat::Json => print_json(&summary, compact)?,
        OutputFormat::Text => println!(
            "{} Indexed {} instruments into {} in {:.2}s",
            "✓".green(),
            summary.documents.to_string().cyan(),
            summary.path.cyan(),
            started.elapsed().as_secs_f64()
        ),
    }

    Ok(())
}
