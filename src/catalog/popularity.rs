// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tier-based popularity assignment
//!
//! Scores are fixed at load time and never recomputed by the search engine.

use std::collections::HashMap;

/// Score for symbols that appear in no tier
pub const DEFAULT_POPULARITY: f64 = 0.2;

/// Most traded large caps
const TIER_ONE: &[(&str, f64)] = &[
    ("RELIANCE", 1.0),
    ("TCS", 0.98),
    ("HDFCBANK", 0.96),
    ("INFY", 0.95),
    ("ICICIBANK", 0.94),
    ("HINDUNILVR", 0.93),
    ("ITC", 0.92),
    ("SBIN", 0.91),
    ("BHARTIARTL", 0.90),
    ("KOTAKBANK", 0.90),
];

/// Well-known large caps
const TIER_TWO: &[(&str, f64)] = &[
    ("BAJFINANCE", 0.85),
    ("LT", 0.84),
    ("ASIANPAINT", 0.83),
    ("AXISBANK", 0.82),
    ("MARUTI", 0.81),
    ("SUNPHARMA", 0.80),
    ("TITAN", 0.79),
    ("NESTLEIND", 0.78),
    ("ULTRACEMCO", 0.77),
    ("WIPRO", 0.76),
    ("TATAMOTORS", 0.75),
    ("TATAPOWER", 0.74),
    ("TATASTEEL", 0.73),
    ("ADANIPORTS", 0.72),
    ("ADANIENT", 0.71),
    ("ONGC", 0.70),
];

/// Mid caps and sector leaders
const TIER_THREE: &[(&str, f64)] = &[
    ("DIVISLAB", 0.65),
    ("DRREDDY", 0.64),
    ("CIPLA", 0.63),
    ("TECHM", 0.62),
    ("HCLTECH", 0.61),
    ("POWERGRID", 0.60),
    ("NTPC", 0.59),
    ("COALINDIA", 0.58),
    ("BPCL", 0.57),
    ("IOC", 0.56),
    ("GRASIM", 0.55),
    ("JSWSTEEL", 0.54),
    ("HINDALCO", 0.53),
    ("VEDL", 0.52),
    ("INDUSINDBK", 0.51),
    ("BAJAJFINSV", 0.50),
    ("M&M", 0.49),
    ("EICHERMOT", 0.48),
    ("HEROMOTOCO", 0.47),
    ("BRITANNIA", 0.46),
    ("SHREECEM", 0.45),
    ("UPL", 0.44),
    ("APOLLOHOSP", 0.43),
    ("PIDILITIND", 0.42),
    ("GODREJCP", 0.41),
    ("DABUR", 0.40),
];

/// Symbol to popularity lookup, passed explicitly to the loader
#[derive(Debug, Clone)]
pub struct PopularityTiers {
    scores: HashMap<String, f64>,
    default_score: f64,
}

impl Default for PopularityTiers {
    fn default() -> Self {
        let scores = TIER_ONE
            .iter()
            .chain(TIER_TWO)
            .chain(TIER_THREE)
            .map(|(symbol, score)| (symbol.to_string(), *score))
            .collect();
        Self {
            scores,
            default_score: DEFAULT_POPULARITY,
        }
    }
}

impl PopularityTiers {
    /// Override or add scores on top of the current table
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        for (symbol, score) in overrides {
            self.scores
                .insert(symbol.as_ref().trim().to_uppercase(), score.clamp(0.0, 1.0));
        }
        self
    }

    pub fn with_default_score(mut self, default_score: f64) -> Self {
        self.default_score = default_score.clamp(0.0, 1.0);
        self
    }

    /// Popularity for a symbol (case-insensitive)
    pub fn score(&self, symbol: &str) -> f64 {
        self.scores
            .get(&symbol.trim().to_uppercase())
            .copied()
            .unwrap_or(self.default_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiered_symbols_get_their_scores() {
        let tiers = PopularityTiers::default();
        assert_eq!(tiers.score("RELIANCE"), 1.0);
        assert_eq!(tiers.score("tcs"), 0.98);
        assert_eq!(tiers.score("WIPRO"), 0.76);
        assert_eq!(tiers.score("M&M"), 0.49);
    }

    #[test]
    fn unknown_symbols_get_default() {
        let tiers = PopularityTiers::default();
        assert_eq!(tiers.score("TATACONSULT"), DEFAULT_POPULARITY);
    }

    #[test]
    fn overrides_replace_tier_scores() {
        let tiers = PopularityTiers::default()
            .with_overrides([("tcs", 0.5), ("NEWCO", 1.4)])
            .with_default_score(0.1);
        assert_eq!(tiers.score("TCS"), 0.5);
        assert_eq!(tiers.score("NEWCO"), 1.0);
        assert_eq!(tiers.score("UNKNOWN"), 0.1);
    }
}
