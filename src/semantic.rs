// SPDX-License-Identifier: MIT OR Apache-2.0

//! Thematic query resolution
//!
//! Detects category-seeking queries ("top banking stocks"), pulls the sector
//! names they mention out of the [`SectorTable`], and expands those sectors
//! into their member symbols.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;

use crate::errors::{Result, ScripError};

/// Phrases that mark a query as asking for a category of instruments
pub const DEFAULT_THEMATIC_PHRASES: &[&str] = &[
    "top",
    "best",
    "leading",
    "largest",
    "biggest",
    "popular",
    "stocks",
    "shares",
    "companies",
    "sector",
    "industry",
    "list of",
    "all",
];

/// Sector name -> trigger keywords, sector name -> member symbols, and
/// member symbol -> industry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorTable {
    keywords: BTreeMap<String, BTreeSet<String>>,
    members: BTreeMap<String, BTreeSet<String>>,
    industries: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SectorFile {
    #[serde(default)]
    sectors: BTreeMap<String, SectorEntry>,
}

#[derive(Debug, Deserialize)]
struct SectorEntry {
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    symbols: Vec<String>,
    /// Industry for every listed member
    #[serde(default)]
    industry: Option<String>,
    /// Per-symbol industries, overriding `industry`
    #[serde(default)]
    industries: BTreeMap<String, String>,
}

impl SectorTable {
    /// Parse a sector table:
    ///
    /// ```json
    /// { "sectors": { "banking": {
    ///     "keywords": ["bank", "lender"],
    ///     "symbols": ["HDFCBANK", "BAJFINANCE"],
    ///     "industry": "Banks",
    ///     "industries": { "BAJFINANCE": "NBFC" }
    /// } } }
    /// ```
    pub fn from_json_str(content: &str) -> std::result::Result<Self, serde_json::Error> {
        let file: SectorFile = serde_json::from_str(content)?;
        let mut table = Self::default();
        for (name, entry) in file.sectors {
            if let Some(industry) = &entry.industry {
                for symbol in &entry.symbols {
                    table.set_industry(symbol, industry);
                }
            }
            for (symbol, industry) in &entry.industries {
                table.set_industry(symbol, industry);
            }
            table.insert(&name, entry.keywords, entry.symbols);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|source| ScripError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    /// Add (or extend) a sector. Names and keywords are lowercased, symbols
    /// uppercased.
    pub fn insert<K, S>(&mut self, name: &str, keywords: K, symbols: S)
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
        S: IntoIterator,
        S::Item: AsRef<str>,
    {
        let name = name.trim().to_lowercase();
        self.keywords.entry(name.clone()).or_default().extend(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty()),
        );
        self.members.entry(name).or_default().extend(
            symbols
                .into_iter()
                .map(|s| s.as_ref().trim().to_uppercase())
                .filter(|s| !s.is_empty()),
        );
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Sector names in alphabetical order
    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }

    pub fn members(&self, sector: &str) -> Option<&BTreeSet<String>> {
        self.members.get(&sector.to_lowercase())
    }

    /// Sectors whose name or any trigger keyword occurs in `query`
    pub fn extract_sectors(&self, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        self.keywords
            .iter()
            .filter(|(name, keywords)| {
                query.contains(name.as_str()) || keywords.iter().any(|k| query.contains(k.as_str()))
            })
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Union of the member symbols of `sectors`
    pub fn symbols_for<I>(&self, sectors: I) -> BTreeSet<String>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        sectors
            .into_iter()
            .filter_map(|sector| self.members(sector.as_ref()))
            .flatten()
            .cloned()
            .collect()
    }

    /// Record the industry of `symbol`; blank industries are ignored
    pub fn set_industry(&mut self, symbol: &str, industry: &str) {
        let industry = industry.trim();
        if industry.is_empty() {
            return;
        }
        self.industries
            .insert(symbol.trim().to_uppercase(), industry.to_string());
    }

    pub fn industry_for_symbol(&self, symbol: &str) -> Option<&str> {
        self.industries
            .get(&symbol.trim().to_uppercase())
            .map(String::as_str)
    }

    /// First sector (alphabetically) listing `symbol` as a member
    pub fn sector_for_symbol(&self, symbol: &str) -> Option<&str> {
        let symbol = symbol.trim().to_uppercase();
        self.members
            .iter()
            .find(|(_, members)| members.contains(&symbol))
            .map(|(name, _)| name.as_str())
    }
}

/// Decides whether a query asks for a category rather than one instrument
pub trait ThematicDetector: Send + Sync {
    fn is_thematic(&self, query: &str) -> bool;
}

impl<F> ThematicDetector for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_thematic(&self, query: &str) -> bool {
        self(query)
    }
}

/// Whole-word phrase matcher
#[derive(Debug, Clone)]
pub struct PhraseDetector {
    phrases: Vec<String>,
}

impl Default for PhraseDetector {
    fn default() -> Self {
        Self::new(DEFAULT_THEMATIC_PHRASES.iter().copied())
    }
}

impl PhraseDetector {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| format!(" {} ", words(p.as_ref()).join(" ")))
                .filter(|p| !p.trim().is_empty())
                .collect(),
        }
    }
}

impl ThematicDetector for PhraseDetector {
    fn is_thematic(&self, query: &str) -> bool {
        let padded = format!(" {} ", words(query).join(" "));
        self.phrases.iter().any(|p| padded.contains(p.as_str()))
    }
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Outcome of thematic resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Not a category query; use regular ranking
    NotThematic,
    /// Category phrasing without a known sector; use regular ranking
    NoSector,
    /// Resolved sectors and the union of their members (may be empty)
    Sectors {
        sectors: Vec<String>,
        symbols: BTreeSet<String>,
    },
}

/// Detector + sector table
pub struct ThematicResolver {
    table: SectorTable,
    detector: Box<dyn ThematicDetector>,
}

impl ThematicResolver {
    pub fn new(table: SectorTable, detector: Box<dyn ThematicDetector>) -> Self {
        Self { table, detector }
    }

    pub fn with_default_detector(table: SectorTable) -> Self {
        Self::new(table, Box::new(PhraseDetector::default()))
    }

    pub fn table(&self) -> &SectorTable {
        &self.table
    }

    pub fn resolve(&self, query: &str) -> Resolution {
        if !self.detector.is_thematic(query) {
            return Resolution::NotThematic;
        }
        let sectors = self.table.extract_sectors(query);
        if sectors.is_empty() {
            return Resolution::NoSector;
        }
        let symbols = self.table.symbols_for(&sectors);
        Resolution::Sectors { sectors, symbols }
    }
}
