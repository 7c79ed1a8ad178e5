// SPDX-License-Identifier: MIT OR Apache-2.0

//! scrip - Ranked instrument lookup library
//!
//! Builds a BM25 catalog store over exchange-listed instruments and answers
//! free-text, symbol and sector ("top banking stocks") queries with results
//! ordered by relevance blended with popularity.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod errors;
pub mod formulator;
pub mod output;
pub mod ranking;
pub mod semantic;
pub mod store;

pub use catalog::Instrument;
pub use engine::StockSearch;
pub use errors::{Result, ScripError};
pub use ranking::RankedInstrument;
pub use semantic::{SectorTable, ThematicResolver};
