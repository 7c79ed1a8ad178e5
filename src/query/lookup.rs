// SPDX-License-Identifier: MIT OR Apache-2.0

//! Get command - exact symbol lookup

use std::path::Path;

use anyhow::{bail, Result};

use super::open_engine;
use crate::cli::OutputFormat;
use scrip::config::Config;
use scrip::output::{print_instrument, print_json};

pub fn run(
    config: &Config,
    index_path: &Path,
    symbol: &str,
    exchange: Option<&str>,
    format: OutputFormat,
    compact: bool,
) -> Result<()> {
    let engine = open_engine(config, index_path)?;

    let found = match exchange {
        Some(exchange) => engine.get_stock(symbol, exchange),
        None => engine.get_by_symbol(symbol),
    };
    engine.close()?;

    let Some(instrument) = found else {
        bail!("No instrument with symbol '{}'", symbol.trim().to_uppercase());
    };

    match format {
        OutputFormat::Json => print_json(&instrument, compact)?,
        OutputFormat::Text => print_instrument(&instrument),
    }

    Ok(())
}
