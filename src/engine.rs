// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search engine - the public entry point over a built catalog store
//!
//! `search` dispatches to thematic (sector, popularity-only) or regular
//! (weighted text + popularity) ranking. `get_by_symbol` and `get_stock`
//! are exact lookups. Store failures during queries are logged and reported
//! as empty results; only construction can fail.

use std::cmp::Ordering;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::catalog::Instrument;
use crate::errors::Result;
use crate::formulator::{QueryFormulator, WeightedQuery};
use crate::ranking::{rank, RankedInstrument, ScoreMode};
use crate::semantic::{Resolution, ThematicResolver};
use crate::store::{CatalogBackend, TantivyStore};

/// Candidates fetched from the store per query
pub const MAX_CANDIDATES: usize = 100;

/// Ranked lookup over an immutable instrument catalog
pub struct StockSearch {
    store: Box<dyn CatalogBackend>,
    formulator: QueryFormulator,
    resolver: ThematicResolver,
    exchange_priority: Vec<String>,
}

impl StockSearch {
    /// Open the persisted store at `path`, building it from `instruments`
    /// only when no store exists there yet.
    pub fn open(
        path: impl AsRef<Path>,
        instruments: &[Instrument],
        resolver: ThematicResolver,
    ) -> Result<Self> {
        let (mut store, created) = TantivyStore::open_or_create(path)?;
        if created {
            populate(&mut store, instruments)?;
        }
        Ok(Self::from_store(Box::new(store), resolver))
    }

    /// Build a fresh in-memory tantivy store
    pub fn in_memory(instruments: &[Instrument], resolver: ThematicResolver) -> Result<Self> {
        let mut store = TantivyStore::open_in_memory()?;
        populate(&mut store, instruments)?;
        Ok(Self::from_store(Box::new(store), resolver))
    }

    /// Populate an empty backend and wrap it
    pub fn with_backend(
        mut store: Box<dyn CatalogBackend>,
        instruments: &[Instrument],
        resolver: ThematicResolver,
    ) -> Result<Self> {
        populate(store.as_mut(), instruments)?;
        Ok(Self::from_store(store, resolver))
    }

    /// Wrap a backend that is already built and committed
    pub fn from_store(store: Box<dyn CatalogBackend>, resolver: ThematicResolver) -> Self {
        Self {
            store,
            formulator: QueryFormulator::default(),
            resolver,
            exchange_priority: Vec::new(),
        }
    }

    /// Exchanges preferred, in order, when a bare symbol is cross-listed
    pub fn with_exchange_priority<I, S>(mut self, exchanges: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.exchange_priority = exchanges
            .into_iter()
            .map(|e| e.as_ref().trim().to_uppercase())
            .collect();
        self
    }

    pub fn with_formulator(mut self, formulator: QueryFormulator) -> Self {
        self.formulator = formulator;
        self
    }

    pub fn num_docs(&self) -> u64 {
        self.store.num_docs()
    }

    /// Ranked instruments for a free-text query
    pub fn search(&self, query: &str) -> Vec<Instrument> {
        self.search_ranked(query)
            .into_iter()
            .map(|r| r.instrument)
            .collect()
    }

    /// Like [`search`](Self::search), keeping relevance and final scores
    pub fn search_ranked(&self, query: &str) -> Vec<RankedInstrument> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        match self.resolver.resolve(query) {
            Resolution::Sectors { sectors, symbols } => {
                debug!(?sectors, members = symbols.len(), "Thematic query");
                if symbols.is_empty() {
                    return Vec::new();
                }
                let thematic = self.formulator.symbol_set(symbols.iter().map(String::as_str));
                self.run(&thematic, ScoreMode::PopularityOnly)
            }
            Resolution::NoSector => {
                debug!(query, "Thematic phrasing without a known sector");
                self.regular_search(query)
            }
            Resolution::NotThematic => self.regular_search(query),
        }
    }

    /// Weighted six-strategy search blended with popularity
    pub fn regular_search(&self, query: &str) -> Vec<RankedInstrument> {
        let regular = self.formulator.regular(query);
        self.run(&regular, ScoreMode::Blended)
    }

    fn run(&self, query: &WeightedQuery, mode: ScoreMode) -> Vec<RankedInstrument> {
        match self.store.search(query, MAX_CANDIDATES) {
            Ok(hits) => {
                debug!(hits = hits.len(), ?mode, "Search complete");
                rank(hits, mode)
            }
            Err(e) => {
                warn!(error = %e, "Search error");
                Vec::new()
            }
        }
    }

    /// Exact, case-insensitive symbol lookup.
    ///
    /// Cross-listed symbols resolve by configured exchange priority, then
    /// higher popularity, then exchange code.
    pub fn get_by_symbol(&self, symbol: &str) -> Option<Instrument> {
        let hits = match self
            .store
            .search(&self.formulator.symbol(symbol), MAX_CANDIDATES)
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, symbol, "Symbol lookup error");
                return None;
            }
        };

        hits.iter()
            .map(|hit| Instrument::from_stored(&hit.fields))
            .min_by(|a, b| self.listing_order(a, b))
    }

    /// Lookup by symbol on one exchange, falling back to
    /// [`get_by_symbol`](Self::get_by_symbol) when the exchange is empty,
    /// unmatched, or the lookup fails.
    pub fn get_stock(&self, symbol: &str, exchange: &str) -> Option<Instrument> {
        if !exchange.trim().is_empty() {
            match self
                .store
                .search(&self.formulator.listing(symbol, exchange), 1)
            {
                Ok(hits) => {
                    if let Some(hit) = hits.first() {
                        return Some(Instrument::from_stored(&hit.fields));
                    }
                    debug!(symbol, exchange, "No listing on exchange, falling back to symbol");
                }
                Err(e) => warn!(error = %e, symbol, exchange, "Listing lookup error"),
            }
        }

        self.get_by_symbol(symbol)
    }

    /// Release the store. Consumes the engine, so it runs once.
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    fn exchange_rank(&self, exchange: &str) -> usize {
        self.exchange_priority
            .iter()
            .position(|e| e.eq_ignore_ascii_case(exchange))
            .unwrap_or(usize::MAX)
    }

    fn listing_order(&self, a: &Instrument, b: &Instrument) -> Ordering {
        self.exchange_rank(&a.exchange)
            .cmp(&self.exchange_rank(&b.exchange))
            .then_with(|| b.popularity_score.total_cmp(&a.popularity_score))
            .then_with(|| a.exchange.cmp(&b.exchange))
    }
}

/// Write every instrument once, keyed by `SYMBOL-EXCHANGE`, then commit
pub fn populate(store: &mut dyn CatalogBackend, instruments: &[Instrument]) -> Result<()> {
    for inst in instruments {
        store.index(&inst.doc_id(), &inst.to_stored())?;
    }
    store.commit()?;
    info!(count = instruments.len(), docs = store.num_docs(), "Indexed catalog");
    Ok(())
}
