// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog model - the Instrument record and its loaders

pub mod loader;
pub mod popularity;

use serde::{Deserialize, Serialize};

use crate::store::{CatalogField, StoredFields};

pub use loader::{CatalogFiles, CatalogLoader};
pub use popularity::PopularityTiers;

/// Instrument kind used when a source does not provide one
pub const DEFAULT_KIND: &str = "Stock";

/// A tradable instrument, unique by `(symbol, exchange)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Comma-joined brand aliases
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default)]
    pub industry: String,
    /// Comma-separated keywords
    #[serde(default)]
    pub tags: String,
    pub popularity_score: f64,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            symbol: String::new(),
            name: String::new(),
            exchange: String::new(),
            kind: DEFAULT_KIND.to_string(),
            brand: String::new(),
            sector: String::new(),
            industry: String::new(),
            tags: String::new(),
            popularity_score: 0.0,
        }
    }
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange: impl Into<String>,
        popularity_score: f64,
    ) -> Self {
        Self {
            symbol: normalize_symbol(&symbol.into()),
            name: name.into(),
            exchange: exchange.into().trim().to_uppercase(),
            popularity_score: popularity_score.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = sector.into();
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = industry.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    /// Store key: `SYMBOL-EXCHANGE`
    pub fn doc_id(&self) -> String {
        doc_id(&self.symbol, &self.exchange)
    }

    /// Rebuild an instrument from a hit's stored fields.
    ///
    /// Absent fields become empty strings or `0.0`; the kind is left empty
    /// rather than defaulted so that what comes back is what was stored.
    pub fn from_stored(fields: &StoredFields) -> Self {
        Self {
            symbol: fields.text(CatalogField::Symbol).to_string(),
            name: fields.text(CatalogField::Name).to_string(),
            exchange: fields.text(CatalogField::Exchange).to_string(),
            kind: fields.text(CatalogField::Kind).to_string(),
            brand: fields.text(CatalogField::Brand).to_string(),
            sector: fields.text(CatalogField::Sector).to_string(),
            industry: fields.text(CatalogField::Industry).to_string(),
            tags: fields.text(CatalogField::Tags).to_string(),
            popularity_score: fields.number(CatalogField::Popularity),
        }
    }

    /// The instrument's field values as written to the store
    pub fn to_stored(&self) -> StoredFields {
        let mut fields = StoredFields::default();
        fields.set_text(CatalogField::Symbol, &self.symbol);
        fields.set_text(CatalogField::Name, &self.name);
        fields.set_text(CatalogField::Exchange, &self.exchange);
        fields.set_text(CatalogField::Kind, &self.kind);
        fields.set_text(CatalogField::Brand, &self.brand);
        fields.set_text(CatalogField::Sector, &self.sector);
        fields.set_text(CatalogField::Industry, &self.industry);
        fields.set_text(CatalogField::Tags, &self.tags);
        fields.set_number(CatalogField::Popularity, self.popularity_score);
        fields
    }
}

pub fn doc_id(symbol: &str, exchange: &str) -> String {
    format!("{}-{}", symbol, exchange)
}

/// Trim and uppercase a ticker
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_symbol_and_exchange() {
        let inst = Instrument::new(" reliance ", "Reliance Industries", "nse", 1.0);
        assert_eq!(inst.symbol, "RELIANCE");
        assert_eq!(inst.exchange, "NSE");
        assert_eq!(inst.kind, DEFAULT_KIND);
        assert_eq!(inst.doc_id(), "RELIANCE-NSE");
    }

    #[test]
    fn new_clamps_popularity() {
        assert_eq!(Instrument::new("A", "A", "NSE", 1.7).popularity_score, 1.0);
        assert_eq!(Instrument::new("A", "A", "NSE", -0.2).popularity_score, 0.0);
    }

    #[test]
    fn stored_fields_round_trip() {
        let inst = Instrument::new("ITC", "ITC Limited", "NSE", 0.92)
            .with_brand("Aashirvaad, Sunfeast")
            .with_sector("fmcg")
            .with_industry("Tobacco")
            .with_tags("cigarettes,hotels");
        assert_eq!(Instrument::from_stored(&inst.to_stored()), inst);
    }

    #[test]
    fn missing_stored_fields_default_to_empty() {
        let inst = Instrument::from_stored(&StoredFields::default());
        assert_eq!(inst.symbol, "");
        assert_eq!(inst.kind, "");
        assert_eq!(inst.popularity_score, 0.0);
    }

    #[test]
    fn serializes_kind_as_type() {
        let inst = Instrument::new("TCS", "Tata Consultancy Services", "NSE", 0.98);
        let value = serde_json::to_value(&inst).expect("serialize");
        assert_eq!(value["type"], "Stock");
        assert_eq!(value["popularity_score"], 0.98);
    }
}
