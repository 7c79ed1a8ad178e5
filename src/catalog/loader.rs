// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog loader - reads exchange listings, curated stocks and brand mappings
//!
//! Produces the enriched instrument list the store is built from. No ranking
//! happens here; popularity comes from [`PopularityTiers`] and sectors from
//! the [`SectorTable`] membership lists.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, warn};

use super::{normalize_symbol, Instrument, PopularityTiers, DEFAULT_KIND};
use crate::errors::{Result, ScripError};
use crate::semantic::SectorTable;

/// Source files for one catalog build
#[derive(Debug, Clone, Default)]
pub struct CatalogFiles {
    /// `Symbol,Name,Exchange,Type,Brand`
    pub curated: Option<PathBuf>,
    /// NSE equity list: `SYMBOL,NAME OF COMPANY,...`
    pub nse: Option<PathBuf>,
    /// BSE equity list: `SYMBOL,NAME OF COMPANY`
    pub bse: Option<PathBuf>,
    /// JSON object of symbol to comma-joined brands
    pub brand_mappings: Option<PathBuf>,
}

impl CatalogFiles {
    /// True when no instrument source is configured
    pub fn has_no_sources(&self) -> bool {
        self.curated.is_none() && self.nse.is_none() && self.bse.is_none()
    }
}

/// Builds the instrument list from [`CatalogFiles`]
#[derive(Debug, Clone, Default)]
pub struct CatalogLoader {
    tiers: PopularityTiers,
}

impl CatalogLoader {
    pub fn new(tiers: PopularityTiers) -> Self {
        Self { tiers }
    }

    /// Load, merge and enrich every configured source.
    ///
    /// Exchange listings that cannot be read are skipped with a warning; a
    /// configured curated file that cannot be read is an error.
    pub fn load(&self, files: &CatalogFiles, sectors: &SectorTable) -> Result<Vec<Instrument>> {
        let mut batches = Vec::new();

        if let Some(path) = &files.nse {
            match self.load_exchange_listing(path, "NSE") {
                Ok(stocks) => {
                    info!(count = stocks.len(), path = %path.display(), "Loaded NSE listing");
                    batches.push(stocks);
                }
                Err(e) => warn!(error = %e, "Failed to load NSE listing, skipping"),
            }
        }

        if let Some(path) = &files.bse {
            match self.load_exchange_listing(path, "BSE") {
                Ok(stocks) => {
                    info!(count = stocks.len(), path = %path.display(), "Loaded BSE listing");
                    batches.push(stocks);
                }
                Err(e) => warn!(error = %e, "Failed to load BSE listing, skipping"),
            }
        }

        // Curated rows go last so their brand data wins over bare listings
        if let Some(path) = &files.curated {
            let stocks = self.load_curated(path)?;
            info!(count = stocks.len(), path = %path.display(), "Loaded curated stocks");
            batches.push(stocks);
        }

        let mut instruments = merge_listings(batches);

        if let Some(path) = &files.brand_mappings {
            match load_brand_mappings(path) {
                Ok(mappings) => {
                    info!(count = mappings.len(), "Loaded brand mappings");
                    apply_brand_mappings(&mut instruments, &mappings);
                }
                Err(e) => warn!(error = %e, "Failed to load brand mappings, skipping"),
            }
        }

        enrich_sectors(&mut instruments, sectors);
        info!(count = instruments.len(), "Catalog ready for indexing");
        Ok(instruments)
    }

    /// Curated CSV with an optional `Symbol,...` header row
    pub fn load_curated(&self, path: &Path) -> Result<Vec<Instrument>> {
        let records = read_records(path)?;
        let mut stocks = Vec::with_capacity(records.len());
        let mut skipped = 0usize;

        for (row, record) in records.iter().enumerate() {
            if row == 0 && field(record, 0).eq_ignore_ascii_case("symbol") {
                continue;
            }
            if record.len() < 4 {
                skipped += 1;
                continue;
            }
            let symbol = field(record, 0);
            let kind = match field(record, 3) {
                "" => DEFAULT_KIND,
                other => other,
            };
            stocks.push(
                Instrument::new(symbol, field(record, 1), field(record, 2), self.tiers.score(symbol))
                    .with_kind(kind)
                    .with_brand(field(record, 4)),
            );
        }

        if skipped > 0 {
            debug!(skipped, path = %path.display(), "Skipped short curated rows");
        }
        Ok(stocks)
    }

    /// Exchange listing whose first row is always a header
    pub fn load_exchange_listing(&self, path: &Path, exchange: &str) -> Result<Vec<Instrument>> {
        let records = read_records(path)?;
        let mut stocks = Vec::with_capacity(records.len().saturating_sub(1));

        for record in records.iter().skip(1) {
            let symbol = field(record, 0);
            if symbol.is_empty() || record.len() < 2 {
                continue;
            }
            stocks.push(Instrument::new(
                symbol,
                field(record, 1),
                exchange,
                self.tiers.score(symbol),
            ));
        }

        Ok(stocks)
    }
}

/// JSON object of `SYMBOL -> "Brand A, Brand B"`
pub fn load_brand_mappings(path: &Path) -> Result<BTreeMap<String, String>> {
    let file = File::open(path)?;
    let raw: BTreeMap<String, String> =
        serde_json::from_reader(file).map_err(|source| ScripError::Json {
            path: path.display().to_string(),
            source,
        })?;
    Ok(raw
        .into_iter()
        .map(|(symbol, brands)| (normalize_symbol(&symbol), brands))
        .collect())
}

/// Append mapped brands to each instrument's brand list
pub fn apply_brand_mappings(instruments: &mut [Instrument], mappings: &BTreeMap<String, String>) {
    for inst in instruments.iter_mut() {
        let Some(brands) = mappings.get(&inst.symbol) else {
            continue;
        };
        if inst.brand.is_empty() {
            inst.brand = brands.clone();
        } else {
            inst.brand = format!("{}, {}", inst.brand, brands);
        }
    }
}

/// Fill empty sectors and industries from the sector table
pub fn enrich_sectors(instruments: &mut [Instrument], sectors: &SectorTable) {
    let mut enriched = 0usize;
    for inst in instruments.iter_mut() {
        let mut changed = false;
        if inst.sector.is_empty() {
            if let Some(sector) = sectors.sector_for_symbol(&inst.symbol) {
                inst.sector = sector.to_string();
                changed = true;
            }
        }
        if inst.industry.is_empty() {
            if let Some(industry) = sectors.industry_for_symbol(&inst.symbol) {
                inst.industry = industry.to_string();
                changed = true;
            }
        }
        if changed {
            enriched += 1;
        }
    }
    debug!(enriched, "Enriched instrument sectors and industries");
}

/// Concatenate batches keeping `(symbol, exchange)` unique.
///
/// A later record replaces an earlier one at the earlier one's position.
pub fn merge_listings(batches: Vec<Vec<Instrument>>) -> Vec<Instrument> {
    let mut merged: Vec<Instrument> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for inst in batches.into_iter().flatten() {
        let key = inst.doc_id();
        match positions.get(&key) {
            Some(&pos) => merged[pos] = inst,
            None => {
                positions.insert(key, merged.len());
                merged.push(inst);
            }
        }
    }

    merged
}

fn read_records(path: &Path) -> Result<Vec<StringRecord>> {
    let csv_error = |source| ScripError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(csv_error)?;

    reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(csv_error)
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}
