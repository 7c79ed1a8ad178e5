// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query formulation - turns raw user text into weighted multi-clause queries
//!
//! Each match strategy is data ([`Strategy`]); the formulator instantiates
//! every strategy against the query text and the store evaluates the
//! resulting clauses, summing the weighted score of each clause a document
//! satisfies.

use crate::store::CatalogField;

/// How a clause's value is compared with a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Whole (lowercased) field value equals the term
    Exact,
    /// Field value starts with the term
    Prefix,
    /// Any analyzed token of the field equals any analyzed token of the text
    TokenMatch,
    /// Field value contains the term anywhere
    Contains,
}

/// One weighted condition against one field
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub kind: MatchKind,
    pub field: CatalogField,
    /// Lowercased match text
    pub value: String,
    pub weight: f32,
}

impl Clause {
    pub fn new(kind: MatchKind, field: CatalogField, value: &str, weight: f32) -> Self {
        Self {
            kind,
            field,
            value: value.trim().to_lowercase(),
            weight,
        }
    }

    /// Unweighted exact-term clause
    pub fn exact(field: CatalogField, value: &str) -> Self {
        Self::new(MatchKind::Exact, field, value, 1.0)
    }
}

/// How clauses combine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    /// Disjunction: a document matching any clause is a hit
    Any,
    /// Conjunction: a document must match every clause
    All,
}

/// A store-independent query: clauses plus their combinator
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedQuery {
    pub combine: Combine,
    pub clauses: Vec<Clause>,
}

impl WeightedQuery {
    pub fn any(clauses: Vec<Clause>) -> Self {
        Self {
            combine: Combine::Any,
            clauses,
        }
    }

    pub fn all(clauses: Vec<Clause>) -> Self {
        Self {
            combine: Combine::All,
            clauses,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// A match strategy: which field, how, and how much it counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strategy {
    pub kind: MatchKind,
    pub field: CatalogField,
    pub weight: f32,
}

/// Strategies of the regular (non-thematic) search path, strongest first
pub const REGULAR_STRATEGIES: [Strategy; 6] = [
    Strategy {
        kind: MatchKind::Exact,
        field: CatalogField::Symbol,
        weight: 10.0,
    },
    Strategy {
        kind: MatchKind::Prefix,
        field: CatalogField::Symbol,
        weight: 5.0,
    },
    Strategy {
        kind: MatchKind::TokenMatch,
        field: CatalogField::Name,
        weight: 3.0,
    },
    Strategy {
        kind: MatchKind::Contains,
        field: CatalogField::Symbol,
        weight: 2.0,
    },
    Strategy {
        kind: MatchKind::Contains,
        field: CatalogField::Name,
        weight: 1.5,
    },
    Strategy {
        kind: MatchKind::Contains,
        field: CatalogField::Brand,
        weight: 1.0,
    },
];

/// Builds [`WeightedQuery`] values for every engine operation
#[derive(Debug, Clone)]
pub struct QueryFormulator {
    strategies: Vec<Strategy>,
}

impl Default for QueryFormulator {
    fn default() -> Self {
        Self::new(REGULAR_STRATEGIES.to_vec())
    }
}

impl QueryFormulator {
    pub fn new(strategies: Vec<Strategy>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Disjunction of every strategy applied to `text`
    pub fn regular(&self, text: &str) -> WeightedQuery {
        WeightedQuery::any(
            self.strategies
                .iter()
                .map(|s| Clause::new(s.kind, s.field, text, s.weight))
                .collect(),
        )
    }

    /// Equal-weight disjunction of exact symbol clauses
    pub fn symbol_set<'a, I>(&self, symbols: I) -> WeightedQuery
    where
        I: IntoIterator<Item = &'a str>,
    {
        WeightedQuery::any(
            symbols
                .into_iter()
                .map(|symbol| Clause::exact(CatalogField::Symbol, symbol))
                .collect(),
        )
    }

    /// Exact symbol match
    pub fn symbol(&self, symbol: &str) -> WeightedQuery {
        WeightedQuery::any(vec![Clause::exact(CatalogField::Symbol, symbol)])
    }

    /// Exact symbol AND exact exchange
    pub fn listing(&self, symbol: &str, exchange: &str) -> WeightedQuery {
        WeightedQuery::all(vec![
            Clause::exact(CatalogField::Symbol, symbol),
            Clause::exact(CatalogField::Exchange, exchange),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_query_has_six_weighted_clauses() {
        let query = QueryFormulator::default().regular("  TCS ");
        assert_eq!(query.combine, Combine::Any);
        assert_eq!(query.clauses.len(), 6);
        assert!(query.clauses.iter().all(|c| c.value == "tcs"));

        let weights: Vec<f32> = query.clauses.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![10.0, 5.0, 3.0, 2.0, 1.5, 1.0]);
        assert_eq!(query.clauses[0].kind, MatchKind::Exact);
        assert_eq!(query.clauses[2].field, CatalogField::Name);
        assert_eq!(query.clauses[5].field, CatalogField::Brand);
    }

    #[test]
    fn symbol_set_clauses_are_equal_weight() {
        let query = QueryFormulator::default().symbol_set(["HDFCBANK", "ICICIBANK"]);
        assert_eq!(query.combine, Combine::Any);
        assert_eq!(query.clauses.len(), 2);
        assert!(query.clauses.iter().all(|c| c.weight == 1.0));
        assert_eq!(query.clauses[1].value, "icicibank");
    }

    #[test]
    fn listing_query_is_conjunctive() {
        let query = QueryFormulator::default().listing("Reliance", "bse");
        assert_eq!(query.combine, Combine::All);
        assert_eq!(query.clauses[0].value, "reliance");
        assert_eq!(query.clauses[1].field, CatalogField::Exchange);
        assert_eq!(query.clauses[1].value, "bse");
    }
}
