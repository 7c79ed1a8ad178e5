// SPDX-License-Identifier: MIT OR Apache-2.0

//! Score combination and result ordering
//!
//! Final ordering is a stable descending sort on the final score, so hits
//! with equal scores keep the order the store returned them in.

use serde::Serialize;

use crate::catalog::Instrument;
use crate::store::ScoredHit;

/// Share of the final score taken by text relevance
pub const RELEVANCE_WEIGHT: f64 = 0.7;
/// Share of the final score taken by popularity
pub const POPULARITY_WEIGHT: f64 = 0.3;

/// How a hit's final score is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreMode {
    /// `relevance * 0.7 + popularity * 0.3`
    Blended,
    /// Popularity alone; relevance is ignored
    PopularityOnly,
}

/// An instrument rebuilt from a hit, with its scores
#[derive(Debug, Clone, Serialize)]
pub struct RankedInstrument {
    #[serde(flatten)]
    pub instrument: Instrument,
    pub text_score: f64,
    pub final_score: f64,
}

pub fn blended_score(text_score: f64, popularity: f64) -> f64 {
    text_score * RELEVANCE_WEIGHT + popularity * POPULARITY_WEIGHT
}

impl ScoreMode {
    pub fn final_score(self, text_score: f64, popularity: f64) -> f64 {
        match self {
            ScoreMode::Blended => blended_score(text_score, popularity),
            ScoreMode::PopularityOnly => popularity,
        }
    }
}

/// Rebuild instruments from hits and order them by final score
pub fn rank(hits: Vec<ScoredHit>, mode: ScoreMode) -> Vec<RankedInstrument> {
    let mut ranked: Vec<RankedInstrument> = hits
        .into_iter()
        .map(|hit| {
            let instrument = Instrument::from_stored(&hit.fields);
            let final_score = mode.final_score(hit.score, instrument.popularity_score);
            RankedInstrument {
                instrument,
                text_score: hit.score,
                final_score,
            }
        })
        .collect();

    // sort_by is stable; ties keep retrieval order
    ranked.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    ranked
}
