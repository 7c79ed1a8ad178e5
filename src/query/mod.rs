// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query module - search, lookup and sector listing commands

pub mod lookup;
pub mod search;
pub mod sectors;

use std::path::Path;

use scrip::config::Config;
use scrip::errors::{Result, ScripError};
use scrip::store::TantivyStore;
use scrip::StockSearch;

/// Open the persisted engine, failing with a hint when no index is built
pub fn open_engine(config: &Config, index_path: &Path) -> Result<StockSearch> {
    if !TantivyStore::exists(index_path) {
        return Err(ScripError::IndexNotFound {
            path: index_path.display().to_string(),
        });
    }

    let engine = StockSearch::open(index_path, &[], config.resolver()?)?;
    Ok(engine.with_exchange_priority(&config.exchange_priority))
}
