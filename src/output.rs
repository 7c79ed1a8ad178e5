// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output helpers shared by the CLI commands

use colored::Colorize;
use serde::Serialize;

use crate::catalog::Instrument;
use crate::ranking::RankedInstrument;

/// Serialize `value` as JSON, pretty unless `compact`
pub fn to_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<()> {
    println!("{}", to_json(value, compact)?);
    Ok(())
}

/// One-line text rendering: `SYMBOL  EXCHANGE  Name  [sector]`
pub fn instrument_line(inst: &Instrument) -> String {
    let mut line = format!(
        "{:<14} {:<4} {}",
        inst.symbol.green().bold(),
        inst.exchange.cyan(),
        inst.name
    );
    if !inst.sector.is_empty() {
        line.push_str(&format!(" {}", format!("[{}]", inst.sector).blue()));
    }
    line
}

/// Numbered result lines; callers handle the empty case
pub fn print_ranked(query: &str, results: &[RankedInstrument]) {
    println!("\n{} Results for: {}\n", "🔍".cyan(), query.yellow());
    for (i, result) in results.iter().enumerate() {
        println!(
            "{:>3}. {} {}",
            i + 1,
            instrument_line(&result.instrument),
            format!("({:.3})", result.final_score).dimmed()
        );
    }
    println!(
        "\n{} Found {} instruments",
        "✓".green(),
        results.len().to_string().cyan()
    );
}

pub fn print_instrument(inst: &Instrument) {
    println!("{}", instrument_line(inst));
    let details = [
        ("Type", inst.kind.as_str()),
        ("Brand", inst.brand.as_str()),
        ("Industry", inst.industry.as_str()),
        ("Tags", inst.tags.as_str()),
    ];
    for (label, value) in details {
        if !value.is_empty() {
            println!("  {:<10} {}", label.dimmed(), value);
        }
    }
    println!("  {:<10} {:.2}", "Popularity".dimmed(), inst.popularity_score);
}
