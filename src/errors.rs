// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types with helpful suggestions
//!
//! Construction and loading failures surface as [`ScripError`]. Query-time
//! store failures never reach callers of the engine; they are logged and
//! turned into empty results.

use std::io;

use thiserror::Error;

/// Errors produced by the catalog store, loaders and configuration
#[derive(Error, Debug)]
pub enum ScripError {
    #[error("Search index error: {0}")]
    Index(#[from] tantivy::TantivyError),

    #[error("Index not found at '{path}'\n\n{}", suggestions::index_not_found_suggestion(.path))]
    IndexNotFound { path: String },

    #[error("Invalid match pattern '{pattern}': {reason}")]
    Pattern { pattern: String, reason: String },

    #[error("Schema error: missing field '{0}'")]
    Schema(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Store is read-only; documents can only be written while it is being built")]
    ReadOnly,
}

pub type Result<T> = std::result::Result<T, ScripError>;

/// Helper functions for creating helpful error messages
pub mod suggestions {
    /// Get suggestion for index not found
    pub fn index_not_found_suggestion(path: &str) -> String {
        format!(
            "Run 'scrip index' to build the catalog index:\n\
             $ scrip index\n\n\
             Or point at an existing index:\n\
             $ scrip --index {} search reliance",
            path
        )
    }

    /// Get suggestion for no results
    pub fn no_results_suggestion(query: &str) -> String {
        format!(
            "No instruments found for '{}'\n\n\
             Try:\n\
             - A ticker symbol or a shorter part of the company name\n\
             - A sector phrase such as \"top banking stocks\"\n\
             - Running 'scrip index --force' if the catalog files changed",
            query
        )
    }
}
