// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration file support for scrip
//!
//! Loads configuration from .scriprc.toml in current directory or ~/.config/scrip/config.toml

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogFiles, PopularityTiers};
use crate::errors::{Result, ScripError};
use crate::semantic::{PhraseDetector, SectorTable, ThematicResolver, DEFAULT_THEMATIC_PHRASES};
use crate::store::INDEX_DIR;

/// Output format for results (mirrored from cli for library use)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigOutputFormat {
    #[default]
    Text,
    Json,
}

/// Catalog source files
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub curated: Option<PathBuf>,
    pub nse: Option<PathBuf>,
    pub bse: Option<PathBuf>,
    pub brand_mappings: Option<PathBuf>,
}

/// Thematic detector tuning
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThematicConfig {
    /// Replaces the built-in phrase list when non-empty
    pub phrases: Vec<String>,
}

/// Popularity tier overrides
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PopularityConfig {
    pub default_score: Option<f64>,
    pub scores: BTreeMap<String, f64>,
}

/// Configuration loaded from .scriprc.toml or ~/.config/scrip/config.toml
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location of the persisted index
    pub index_path: Option<PathBuf>,
    /// Sector table JSON
    pub sector_table: Option<PathBuf>,
    /// Exchange preference for cross-listed symbols
    pub exchange_priority: Vec<String>,
    /// Maximum number of results to print
    pub max_results: Option<usize>,
    /// Default output format (text or json)
    pub default_format: Option<String>,
    pub catalog: CatalogConfig,
    pub thematic: ThematicConfig,
    pub popularity: PopularityConfig,
}

impl Config {
    /// Load configuration from files
    ///
    /// Precedence (highest to lowest):
    /// 1. .scriprc.toml in current directory
    /// 2. ~/.config/scrip/config.toml
    pub fn load() -> Self {
        // Try current directory first
        if let Some(config) = Self::load_from_path(Path::new(".scriprc.toml")) {
            return config;
        }

        // Try home directory config
        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("scrip").join("config.toml");
            if let Some(config) = Self::load_from_path(&config_path) {
                return config;
            }
        }

        Self::default()
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to parse config");
                None
            }
        }
    }

    /// Get output format from config, parsing the string to ConfigOutputFormat
    pub fn output_format(&self) -> Option<ConfigOutputFormat> {
        self.default_format.as_ref().and_then(|s| match s.to_lowercase().as_str() {
            "json" => Some(ConfigOutputFormat::Json),
            "text" => Some(ConfigOutputFormat::Text),
            _ => None,
        })
    }

    /// Merge CLI options with config (CLI wins)
    pub fn merge_max_results(&self, cli_value: Option<usize>) -> usize {
        cli_value.or(self.max_results).unwrap_or(20)
    }

    /// Index location (CLI wins)
    pub fn merge_index_path(&self, cli_value: Option<&Path>) -> PathBuf {
        cli_value
            .map(Path::to_path_buf)
            .or_else(|| self.index_path.clone())
            .unwrap_or_else(|| PathBuf::from(INDEX_DIR))
    }

    pub fn catalog_files(&self) -> CatalogFiles {
        CatalogFiles {
            curated: self.catalog.curated.clone(),
            nse: self.catalog.nse.clone(),
            bse: self.catalog.bse.clone(),
            brand_mappings: self.catalog.brand_mappings.clone(),
        }
    }

    pub fn popularity_tiers(&self) -> PopularityTiers {
        let tiers = PopularityTiers::default().with_overrides(
            self.popularity
                .scores
                .iter()
                .map(|(symbol, score)| (symbol.as_str(), *score)),
        );
        match self.popularity.default_score {
            Some(score) => tiers.with_default_score(score),
            None => tiers,
        }
    }

    pub fn thematic_detector(&self) -> PhraseDetector {
        if self.thematic.phrases.is_empty() {
            PhraseDetector::new(DEFAULT_THEMATIC_PHRASES.iter().copied())
        } else {
            PhraseDetector::new(self.thematic.phrases.iter())
        }
    }

    /// Configured sector table, or an empty one when none is set
    pub fn sector_table(&self) -> Result<SectorTable> {
        match &self.sector_table {
            Some(path) if !path.exists() => Err(ScripError::Config(format!(
                "sector_table '{}' does not exist",
                path.display()
            ))),
            Some(path) => SectorTable::load(path),
            None => Ok(SectorTable::default()),
        }
    }

    pub fn resolver(&self) -> Result<ThematicResolver> {
        Ok(ThematicResolver::new(
            self.sector_table()?,
            Box::new(self.thematic_detector()),
        ))
    }
}
