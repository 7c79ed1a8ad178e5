// SPDX-License-Identifier: MIT OR Apache-2.0

//! scrip - Ranked instrument lookup tool
//!
//! Indexes exchange listings with tantivy and answers symbol, name, brand
//! and sector queries ranked by BM25 relevance blended with popularity.

mod cli;
mod indexer;
mod query;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, OutputFormat};
use scrip::config::{Config, ConfigOutputFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Config::load();
    let format = cli.format.unwrap_or(match config.output_format() {
        Some(ConfigOutputFormat::Json) => OutputFormat::Json,
        _ => OutputFormat::Text,
    });
    let index_path = config.merge_index_path(cli.index.as_deref());
    let compact = cli.compact;

    match cli.command {
        Commands::Index { force } => {
            indexer::index::run(&config, &index_path, force, format, compact)?;
        }
        Commands::Search { query, limit } => {
            let limit = config.merge_max_results(limit);
            query::search::run(&config, &index_path, &query, limit, format, compact)?;
        }
        Commands::Get { symbol, exchange } => {
            query::lookup::run(
                &config,
                &index_path,
                &symbol,
                exchange.as_deref(),
                format,
                compact,
            )?;
        }
        Commands::Sectors => {
            query::sectors::run(&config, format, compact)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "scrip", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let env_filter = EnvFilter::try_from_env("SCRIP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
