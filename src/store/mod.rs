// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog store - backend-agnostic index of instruments
//!
//! Ranking code only talks to [`CatalogBackend`]. Two backends exist:
//! [`TantivyStore`] (BM25 index on disk or in RAM) and [`MemoryStore`]
//! (direct evaluation over a vector, useful for tests and small catalogs).

pub mod memory;
pub mod tantivy;

use std::collections::BTreeMap;

use crate::errors::Result;
use crate::formulator::WeightedQuery;

pub use self::memory::MemoryStore;
pub use self::tantivy::TantivyStore;

/// Directory used for the persisted index, relative to the working directory
pub const INDEX_DIR: &str = ".scrip/index";

/// Fields every backend stores per instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CatalogField {
    Symbol,
    Name,
    Exchange,
    Kind,
    Brand,
    Sector,
    Industry,
    Tags,
    Popularity,
}

impl CatalogField {
    pub const ALL: [CatalogField; 9] = [
        CatalogField::Symbol,
        CatalogField::Name,
        CatalogField::Exchange,
        CatalogField::Kind,
        CatalogField::Brand,
        CatalogField::Sector,
        CatalogField::Industry,
        CatalogField::Tags,
        CatalogField::Popularity,
    ];

    /// Field name as it appears in the index schema
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogField::Symbol => "symbol",
            CatalogField::Name => "name",
            CatalogField::Exchange => "exchange",
            CatalogField::Kind => "type",
            CatalogField::Brand => "brand",
            CatalogField::Sector => "sector",
            CatalogField::Industry => "industry",
            CatalogField::Tags => "tags",
            CatalogField::Popularity => "popularity_score",
        }
    }
}

/// A single stored value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

/// Stored values of one document, as written or as read back from a hit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredFields {
    values: BTreeMap<CatalogField, FieldValue>,
}

impl StoredFields {
    pub fn set_text(&mut self, field: CatalogField, value: impl Into<String>) {
        self.values.insert(field, FieldValue::Text(value.into()));
    }

    pub fn set_number(&mut self, field: CatalogField, value: f64) {
        self.values.insert(field, FieldValue::Number(value));
    }

    /// Text value, or `""` when absent or numeric
    pub fn text(&self, field: CatalogField) -> &str {
        match self.values.get(&field) {
            Some(FieldValue::Text(s)) => s,
            _ => "",
        }
    }

    /// Numeric value, or `0.0` when absent or textual
    pub fn number(&self, field: CatalogField) -> f64 {
        match self.values.get(&field) {
            Some(FieldValue::Number(n)) => *n,
            _ => 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One search hit: the store key, the backend's relevance and stored fields
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub doc_id: String,
    pub score: f64,
    pub fields: StoredFields,
}

/// Capability interface of a catalog store.
///
/// Writes happen only during the single build phase (`&mut self`); after
/// [`commit`](CatalogBackend::commit) the store is read-only and shared
/// across threads. Hits come back in the backend's relevance order, which
/// is the "retrieval order" ranking ties fall back to.
pub trait CatalogBackend: Send + Sync {
    /// Write one document under `doc_id`
    fn index(&mut self, doc_id: &str, fields: &StoredFields) -> Result<()>;

    /// Make written documents visible and end the write phase
    fn commit(&mut self) -> Result<()>;

    /// Evaluate a weighted query, returning at most `limit` hits
    fn search(&self, query: &WeightedQuery, limit: usize) -> Result<Vec<ScoredHit>>;

    /// Number of searchable documents
    fn num_docs(&self) -> u64;

    /// Release underlying resources
    fn close(self: Box<Self>) -> Result<()>;
}
