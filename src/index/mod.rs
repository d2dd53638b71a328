//! In-process document index backing the catalog's document store.
//!
//! Documents are JSON source objects keyed by `(doc_type, id)`, so several
//! entity kinds can share one index without their IDs colliding. The index
//! supports upsert, exact get, multi-get in a single round trip, match-all
//! listing and ranked multi-field text search.

mod actor;
mod client;
mod scoring;

pub use actor::*;
pub use client::*;

use serde_json::Value;

/// Name of the index holding catalog documents.
pub const CATALOG_INDEX: &str = "catalog";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocKey {
    pub doc_type: String,
    pub id: String,
}

impl DocKey {
    pub fn new(doc_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            id: id.into(),
        }
    }
}

/// A document returned by a multi-get or search.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub score: u32,
    pub source: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    MatchAll,
    /// Free text matched against the named fields, the first field weighted
    /// highest. Text without any terms behaves as `MatchAll`.
    MultiMatch { text: String, fields: Vec<String> },
}
