// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory catalog backend
//!
//! Evaluates clauses directly against stored values. Exact, prefix and
//! substring clauses score their weight when satisfied; a token clause
//! scores its weight times the share of query tokens found in the field.

use std::collections::HashMap;

use super::{CatalogBackend, ScoredHit, StoredFields};
use crate::errors::Result;
use crate::formulator::{Clause, Combine, MatchKind, WeightedQuery};

/// Tokens longer than this are dropped, as the index tokenizer does
const MAX_TOKEN_LEN: usize = 40;

#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Vec<(String, StoredFields)>,
    pending: Vec<(String, StoredFields)>,
    positions: HashMap<String, usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn clause_score(clause: &Clause, fields: &StoredFields) -> Option<f64> {
        let value = fields.text(clause.field).to_lowercase();
        let weight = f64::from(clause.weight);
        match clause.kind {
            MatchKind::Exact => (value == clause.value).then_some(weight),
            MatchKind::Prefix => value.starts_with(&clause.value).then_some(weight),
            MatchKind::Contains => value.contains(clause.value.as_str()).then_some(weight),
            MatchKind::TokenMatch => {
                let wanted = analyze(&clause.value);
                if wanted.is_empty() {
                    return None;
                }
                let present = analyze(&value);
                let matched = wanted.iter().filter(|t| present.contains(t)).count();
                (matched > 0).then(|| weight * matched as f64 / wanted.len() as f64)
            }
        }
    }

    fn score(query: &WeightedQuery, fields: &StoredFields) -> Option<f64> {
        let mut total = 0.0;
        let mut matched_any = false;
        for clause in &query.clauses {
            match Self::clause_score(clause, fields) {
                Some(score) => {
                    total += score;
                    matched_any = true;
                }
                None if query.combine == Combine::All => return None,
                None => {}
            }
        }
        matched_any.then_some(total)
    }
}

impl CatalogBackend for MemoryStore {
    fn index(&mut self, doc_id: &str, fields: &StoredFields) -> Result<()> {
        self.pending.push((doc_id.to_string(), fields.clone()));
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        for (doc_id, fields) in self.pending.drain(..) {
            match self.positions.get(&doc_id) {
                Some(&pos) => self.docs[pos].1 = fields,
                None => {
                    self.positions.insert(doc_id.clone(), self.docs.len());
                    self.docs.push((doc_id, fields));
                }
            }
        }
        Ok(())
    }

    fn search(&self, query: &WeightedQuery, limit: usize) -> Result<Vec<ScoredHit>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut hits: Vec<ScoredHit> = self
            .docs
            .iter()
            .filter_map(|(doc_id, fields)| {
                Self::score(query, fields).map(|score| ScoredHit {
                    doc_id: doc_id.clone(),
                    score,
                    fields: fields.clone(),
                })
            })
            .collect();

        // Stable: equal scores stay in insertion order
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    fn num_docs(&self) -> u64 {
        self.docs.len() as u64
    }

    fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

/// Split on non-alphanumeric characters and lowercase
pub fn analyze(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty() && t.len() <= MAX_TOKEN_LEN)
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Instrument;
    use crate::formulator::QueryFormulator;

    fn store_with(instruments: &[Instrument]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for inst in instruments {
            store.index(&inst.doc_id(), &inst.to_stored()).expect("index");
        }
        store.commit().expect("commit");
        store
    }

    #[test]
    fn documents_are_invisible_until_commit() {
        let mut store = MemoryStore::new();
        let inst = Instrument::new("TCS", "Tata Consultancy Services", "NSE", 0.98);
        store.index(&inst.doc_id(), &inst.to_stored()).expect("index");
        assert_eq!(store.num_docs(), 0);
        store.commit().expect("commit");
        assert_eq!(store.num_docs(), 1);
    }

    #[test]
    fn same_key_replaces_document() {
        let store = store_with(&[
            Instrument::new("TCS", "Old Name", "NSE", 0.98),
            Instrument::new("TCS", "Tata Consultancy Services", "NSE", 0.98),
        ]);
        assert_eq!(store.num_docs(), 1);
        let hits = store
            .search(&QueryFormulator::default().symbol("tcs"), 10)
            .expect("search");
        assert_eq!(hits[0].fields.text(crate::store::CatalogField::Name), "Tata Consultancy Services");
    }

    #[test]
    fn regular_query_sums_satisfied_clause_weights() {
        let store = store_with(&[
            Instrument::new("TCS", "Tata Consultancy Services", "NSE", 0.98),
            Instrument::new("TATACONSULT", "Tata Consultancy Holdings", "BSE", 0.2),
        ]);
        let hits = store
            .search(&QueryFormulator::default().regular("TCS"), 100)
            .expect("search");

        assert_eq!(hits.len(), 1);
        // exact + prefix + symbol contains
        assert_eq!(hits[0].score, 17.0);
        assert_eq!(hits[0].doc_id, "TCS-NSE");
    }

    #[test]
    fn token_match_scores_share_of_query_tokens() {
        let store = store_with(&[Instrument::new("INFY", "Infosys Limited", "NSE", 0.95)]);
        let query = WeightedQuery::any(vec![Clause::new(
            MatchKind::TokenMatch,
            crate::store::CatalogField::Name,
            "infosys bank",
            3.0,
        )]);
        let hits = store.search(&query, 10).expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].score, 1.5);
    }

    #[test]
    fn conjunction_requires_every_clause() {
        let store = store_with(&[
            Instrument::new("RELIANCE", "Reliance Industries", "NSE", 1.0),
            Instrument::new("RELIANCE", "Reliance Industries", "BSE", 1.0),
        ]);
        let formulator = QueryFormulator::default();
        let hits = store
            .search(&formulator.listing("reliance", "bse"), 10)
            .expect("search");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "RELIANCE-BSE");

        let none = store
            .search(&formulator.listing("reliance", "xse"), 10)
            .expect("search");
        assert!(none.is_empty());
    }

    #[test]
    fn analyze_lowercases_and_splits() {
        assert_eq!(analyze("Tata Consultancy-Services"), vec!["tata", "consultancy", "services"]);
        assert!(analyze(" -- ").is_empty());
    }
}
