// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sectors command - lists the configured sector table

use std::collections::BTreeMap;

use anyhow::Result;
use colored::Colorize;

use crate::cli::OutputFormat;
use scrip::config::Config;
use scrip::output::print_json;

pub fn run(config: &Config, format: OutputFormat, compact: bool) -> Result<()> {
    let table = config.sector_table()?;

    match format {
        OutputFormat::Json => {
            let listing: BTreeMap<&str, Vec<&str>> = table
                .sectors()
                .map(|sector| {
                    let members = table
                        .members(sector)
                        .map(|m| m.iter().map(String::as_str).collect())
                        .unwrap_or_default();
                    (sector, members)
                })
                .collect();
            print_json(&listing, compact)?;
        }
        OutputFormat::Text => {
            if table.is_empty() {
                println!("{} No sectors configured (set sector_table in .scriprc.toml)", "✗".red());
                return Ok(());
            }
            for sector in table.sectors() {
                let members: Vec<&str> = table
                    .members(sector)
                    .map(|m| m.iter().map(String::as_str).collect())
                    .unwrap_or_default();
                println!(
                    "{} {} {}",
                    sector.green().bold(),
                    format!("({})", members.len()).dimmed(),
                    members.join(", ")
                );
            }
        }
    }

    Ok(())
}
