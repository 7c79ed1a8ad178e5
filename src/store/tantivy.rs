// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tantivy-backed catalog store
//!
//! Every text attribute is indexed twice: analyzed (`name`, tokenized and
//! lowercased, stored verbatim) for token matches, and as a single
//! lowercased term (`name_key`) for exact, prefix and substring matches.
//! Prefix and substring clauses become anchored regex queries over the key
//! field; exact and token clauses are BM25 term queries. Every clause is
//! boosted by its weight and the clauses are combined in one boolean query,
//! so a hit's score is the sum of its satisfied weighted clauses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, Schema, Value, FAST, INDEXED, STORED, STRING, TEXT,
};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tracing::{debug, info};

use super::{CatalogBackend, CatalogField, ScoredHit, StoredFields};
use crate::errors::{Result, ScripError};
use crate::formulator::{Clause, Combine, MatchKind, WeightedQuery};

/// Indexing memory budget for on-disk stores
pub const WRITER_BUDGET_BYTES: usize = 50_000_000;

const ID_FIELD: &str = "id";
const KEY_SUFFIX: &str = "_key";

/// Analyzed + key field handles for one text attribute
#[derive(Debug, Clone, Copy)]
struct TextFields {
    analyzed: Field,
    key: Field,
}

#[derive(Debug, Clone)]
struct StoreFields {
    id: Field,
    text: HashMap<CatalogField, TextFields>,
    popularity: Field,
}

impl StoreFields {
    fn text(&self, field: CatalogField) -> Result<TextFields> {
        self.text
            .get(&field)
            .copied()
            .ok_or(ScripError::Schema(field.as_str()))
    }
}

/// BM25 catalog index using Tantivy
pub struct TantivyStore {
    index: Index,
    reader: IndexReader,
    writer: Mutex<Option<IndexWriter>>,
    fields: StoreFields,
}

impl TantivyStore {
    /// Open the store at `path`, or create an empty one.
    ///
    /// Returns the store and whether it was newly created. A reopened store
    /// has no writer: its contents are served as-is.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<(Self, bool)> {
        let path = path.as_ref();

        if path.join("meta.json").exists() {
            let index = Index::open_in_dir(path)?;
            let fields = extract_fields(&index.schema())?;
            let reader = open_reader(&index)?;
            info!(path = %path.display(), docs = reader.searcher().num_docs(), "Opened existing index");
            return Ok((Self::assemble(index, reader, None, fields), false));
        }

        std::fs::create_dir_all(path)?;
        let schema = build_schema();
        let fields = extract_fields(&schema)?;
        let index = Index::create_in_dir(path, schema)?;
        let reader = open_reader(&index)?;
        let writer = index.writer(WRITER_BUDGET_BYTES)?;
        info!(path = %path.display(), "Created new index");
        Ok((Self::assemble(index, reader, Some(writer), fields), true))
    }

    /// Open an empty in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let schema = build_schema();
        let fields = extract_fields(&schema)?;
        let index = Index::create_in_ram(schema);
        let reader = open_reader(&index)?;
        let writer = index.writer(15_000_000)?;
        Ok(Self::assemble(index, reader, Some(writer), fields))
    }

    /// Whether a persisted store exists at `path`
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().join("meta.json").exists()
    }

    fn assemble(
        index: Index,
        reader: IndexReader,
        writer: Option<IndexWriter>,
        fields: StoreFields,
    ) -> Self {
        Self {
            index,
            reader,
            writer: Mutex::new(writer),
            fields,
        }
    }

    fn writer_mut(&mut self) -> Result<&mut IndexWriter> {
        self.writer
            .get_mut()
            .map_err(|e| {
                ScripError::Index(tantivy::TantivyError::InternalError(format!(
                    "Failed to acquire write lock: {e}"
                )))
            })?
            .as_mut()
            .ok_or(ScripError::ReadOnly)
    }

    fn analyze(&self, field: Field, text: &str) -> Result<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(field)?;
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        Ok(tokens)
    }

    /// Translate one clause; `None` when the clause cannot match anything
    fn clause_query(&self, clause: &Clause) -> Result<Option<Box<dyn Query>>> {
        let fields = self.fields.text(clause.field)?;
        let query: Box<dyn Query> = match clause.kind {
            MatchKind::Exact => Box::new(TermQuery::new(
                Term::from_field_text(fields.key, &clause.value),
                IndexRecordOption::Basic,
            )),
            MatchKind::Prefix => {
                regex_query(&format!("{}.*", escape_pattern(&clause.value)), fields.key)?
            }
            MatchKind::Contains => {
                regex_query(&format!(".*{}.*", escape_pattern(&clause.value)), fields.key)?
            }
            MatchKind::TokenMatch => {
                let tokens = self.analyze(fields.analyzed, &clause.value)?;
                if tokens.is_empty() {
                    return Ok(None);
                }
                let terms: Vec<(Occur, Box<dyn Query>)> = tokens
                    .iter()
                    .map(|token| {
                        let term = Term::from_field_text(fields.analyzed, token);
                        let query: Box<dyn Query> =
                            Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                        (Occur::Should, query)
                    })
                    .collect();
                Box::new(BooleanQuery::new(terms))
            }
        };
        Ok(Some(Box::new(BoostQuery::new(query, clause.weight))))
    }

    fn build_query(&self, query: &WeightedQuery) -> Result<Option<Box<dyn Query>>> {
        let occur = match query.combine {
            Combine::Any => Occur::Should,
            Combine::All => Occur::Must,
        };

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(query.clauses.len());
        for clause in &query.clauses {
            match self.clause_query(clause)? {
                Some(q) => clauses.push((occur, q)),
                // A conjunction with an unsatisfiable clause matches nothing
                None if occur == Occur::Must => return Ok(None),
                None => {}
            }
        }

        if clauses.is_empty() {
            return Ok(None);
        }
        Ok(Some(Box::new(BooleanQuery::new(clauses))))
    }

    fn read_hit(&self, score: f32, doc: &TantivyDocument) -> ScoredHit {
        let doc_id = doc
            .get_first(self.fields.id)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut fields = StoredFields::default();
        for (catalog_field, handles) in &self.fields.text {
            if let Some(text) = doc.get_first(handles.analyzed).and_then(|v| v.as_str()) {
                fields.set_text(*catalog_field, text);
            }
        }
        if let Some(popularity) = doc
            .get_first(self.fields.popularity)
            .and_then(|v| v.as_f64())
        {
            fields.set_number(CatalogField::Popularity, popularity);
        }

        ScoredHit {
            doc_id,
            score: f64::from(score),
            fields,
        }
    }
}

impl CatalogBackend for TantivyStore {
    fn index(&mut self, doc_id: &str, stored: &StoredFields) -> Result<()> {
        let mut doc = TantivyDocument::new();
        doc.add_text(self.fields.id, doc_id);
        for (catalog_field, handles) in &self.fields.text {
            let value = stored.text(*catalog_field);
            doc.add_text(handles.analyzed, value);
            doc.add_text(handles.key, value.to_lowercase());
        }
        doc.add_f64(
            self.fields.popularity,
            stored.number(CatalogField::Popularity),
        );

        let id_term = Term::from_field_text(self.fields.id, doc_id);
        let writer = self.writer_mut()?;
        writer.delete_term(id_term);
        writer.add_document(doc)?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        let writer = self
            .writer
            .get_mut()
            .map_err(|e| {
                ScripError::Index(tantivy::TantivyError::InternalError(format!(
                    "Failed to acquire write lock: {e}"
                )))
            })?
            .take();

        if let Some(mut writer) = writer {
            writer.commit()?;
            // Releases the directory lock; the store is read-only from here on
            writer.wait_merging_threads()?;
        }

        self.reader.reload()?;
        debug!(docs = self.num_docs(), "Committed catalog index");
        Ok(())
    }

    fn search(&self, query: &WeightedQuery, limit: usize) -> Result<Vec<ScoredHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(tantivy_query) = self.build_query(query)? else {
            return Ok(Vec::new());
        };

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&tantivy_query, &TopDocs::with_limit(limit))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: TantivyDocument = searcher.doc(doc_address)?;
            hits.push(self.read_hit(score, &doc));
        }
        Ok(hits)
    }

    fn num_docs(&self) -> u64 {
        self.reader.searcher().num_docs()
    }

    fn close(self: Box<Self>) -> Result<()> {
        let TantivyStore { writer, .. } = *self;
        if let Ok(Some(writer)) = writer.into_inner() {
            // Uncommitted writes are discarded
            writer.wait_merging_threads()?;
        }
        Ok(())
    }
}

fn open_reader(index: &Index) -> Result<IndexReader> {
    Ok(index
        .reader_builder()
        .reload_policy(ReloadPolicy::Manual)
        .try_into()?)
}

fn regex_query(pattern: &str, field: Field) -> Result<Box<dyn Query>> {
    let query = RegexQuery::from_pattern(pattern, field).map_err(|e| ScripError::Pattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Box::new(query))
}

/// Escape the metacharacters of tantivy's term regex dialect
fn escape_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        if matches!(
            ch,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Build the Tantivy schema for catalog indexing
fn build_schema() -> Schema {
    let mut builder = Schema::builder();
    builder.add_text_field(ID_FIELD, STRING | STORED);

    for field in CatalogField::ALL {
        if field == CatalogField::Popularity {
            continue;
        }
        builder.add_text_field(field.as_str(), TEXT | STORED);
        builder.add_text_field(&format!("{}{}", field.as_str(), KEY_SUFFIX), STRING);
    }

    builder.add_f64_field(CatalogField::Popularity.as_str(), INDEXED | STORED | FAST);
    builder.build()
}

/// Extract field handles from schema
fn extract_fields(schema: &Schema) -> Result<StoreFields> {
    let id = schema
        .get_field(ID_FIELD)
        .map_err(|_| ScripError::Schema(ID_FIELD))?;
    let popularity = schema
        .get_field(CatalogField::Popularity.as_str())
        .map_err(|_| ScripError::Schema(CatalogField::Popularity.as_str()))?;

    let mut text = HashMap::new();
    for field in CatalogField::ALL {
        if field == CatalogField::Popularity {
            continue;
        }
        let analyzed = schema
            .get_field(field.as_str())
            .map_err(|_| ScripError::Schema(field.as_str()))?;
        let key = schema
            .get_field(&format!("{}{}", field.as_str(), KEY_SUFFIX))
            .map_err(|_| ScripError::Schema(field.as_str()))?;
        text.insert(field, TextFields { analyzed, key });
    }

    Ok(StoreFields {
        id,
        text,
        popularity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Instrument;
    use crate::formulator::QueryFormulator;
    use tempfile::TempDir;

    fn sample_catalog() -> Vec<Instrument> {
        vec![
            Instrument::new("TCS", "Tata Consultancy Services", "NSE", 0.98).with_brand("TCS iON"),
            Instrument::new("TATACONSULT", "Tata Consultancy Holdings", "BSE", 0.2),
            Instrument::new("HDFCBANK", "HDFC Bank Limited", "NSE", 0.96).with_sector("banking"),
            Instrument::new("M&M", "Mahindra & Mahindra", "NSE", 0.49).with_brand("Scorpio, Thar"),
        ]
    }

    fn populated(store: &mut TantivyStore) {
        for inst in sample_catalog() {
            store.index(&inst.doc_id(), &inst.to_stored()).expect("index");
        }
        store.commit().expect("commit");
    }

    #[test]
    fn escape_pattern_only_touches_metacharacters() {
        assert_eq!(escape_pattern("m&m"), "m&m");
        assert_eq!(escape_pattern("a.b*"), "a\\.b\\*");
    }

    #[test]
    fn in_memory_store_indexes_and_counts() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        assert_eq!(store.num_docs(), 0);
        populated(&mut store);
        assert_eq!(store.num_docs(), 4);
    }

    #[test]
    fn writes_after_commit_are_rejected() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        populated(&mut store);
        let inst = Instrument::new("INFY", "Infosys", "NSE", 0.95);
        let err = store.index(&inst.doc_id(), &inst.to_stored()).unwrap_err();
        assert!(matches!(err, ScripError::ReadOnly));
    }

    #[test]
    fn exact_symbol_match_is_case_insensitive() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        populated(&mut store);
        let hits = store
            .search(&QueryFormulator::default().symbol("hdfcBank"), 10)
            .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "HDFCBANK-NSE");
    }

    #[test]
    fn stored_fields_come_back_verbatim() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        populated(&mut store);
        let hits = store
            .search(&QueryFormulator::default().symbol("m&m"), 10)
            .expect("search");
        assert_eq!(hits.len(), 1);
        let inst = Instrument::from_stored(&hits[0].fields);
        assert_eq!(inst, sample_catalog()[3]);
    }

    #[test]
    fn substring_clauses_escape_regex_metacharacters() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        populated(&mut store);
        let hits = store
            .search(&QueryFormulator::default().regular("a & m"), 10)
            .expect("search");
        assert_eq!(hits[0].doc_id, "M&M-NSE");
    }

    #[test]
    fn regular_query_prefers_exact_symbol() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        populated(&mut store);
        let hits = store
            .search(&QueryFormulator::default().regular("tcs"), 100)
            .expect("search");
        assert_eq!(hits[0].doc_id, "TCS-NSE");
        // exact + prefix + symbol contains + brand contains, each boosted
        assert!(hits[0].score > 4.5);
    }

    #[test]
    fn conjunction_filters_by_exchange() {
        let mut store = TantivyStore::open_in_memory().expect("open");
        populated(&mut store);
        let formulator = QueryFormulator::default();
        assert_eq!(
            store.search(&formulator.listing("TCS", "NSE"), 10).expect("search").len(),
            1
        );
        assert!(store
            .search(&formulator.listing("TCS", "BSE"), 10)
            .expect("search")
            .is_empty());
    }

    #[test]
    fn persisted_store_is_reopened_without_writer() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("index");

        let (mut store, created) = TantivyStore::open_or_create(&path).expect("create");
        assert!(created);
        populated(&mut store);
        Box::new(store).close().expect("close");

        assert!(TantivyStore::exists(&path));
        let (mut reopened, created) = TantivyStore::open_or_create(&path).expect("reopen");
        assert!(!created);
        assert_eq!(reopened.num_docs(), 4);
        let inst = Instrument::new("INFY", "Infosys", "NSE", 0.95);
        assert!(reopened.index(&inst.doc_id(), &inst.to_stored()).is_err());
    }
}
