//! Passage cache keyed by passage id and bible abbreviation.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api_bible::types::{PassageAndFums, PassageOptions};
use crate::cache::store::{self, timestamp};
use crate::constants::cache::PASSAGES_FILE;
use crate::error::Result;

/// Everything that determines a passage response.
///
/// Two queries hit the same cache entry only when every field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageQuery {
    /// Canonical passage id.
    #[serde(rename = "passageID")]
    pub passage_id: String,
    /// Upstream bible id.
    #[serde(rename = "bibleID")]
    pub bible_id: String,
    /// Formatting flags.
    #[serde(flatten)]
    pub options: PassageOptions,
}

/// A stored upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPassage {
    /// The query that produced the response.
    pub query: PassageQuery,
    /// The response as returned by the API.
    pub response: PassageAndFums,
    /// When it was fetched.
    #[serde(with = "timestamp")]
    pub cached_on: DateTime<Utc>,
}

/// Composite key to cached responses.
pub type Passages = BTreeMap<String, Vec<CachedPassage>>;

/// Cache key for a passage in a bible.
pub fn passage_key(passage_id: &str, bible_abbreviation: &str) -> String {
    format!("{passage_id}@{bible_abbreviation}")
}

/// Drop records cached before `threshold`, then keys left empty.
pub fn clean_passages(passages: &mut Passages, threshold: Option<DateTime<Utc>>) -> bool {
    let mut removed = false;
    passages.retain(|_, records| {
        let before = records.len();
        records.retain(|p| store::is_fresh(p.cached_on, threshold));
        removed |= records.len() != before;
        !records.is_empty()
    });
    removed
}

/// In-memory passage cache with dirty tracking.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassagesCache {
    /// Composite key to cached responses.
    pub passages: Passages,
    updated_since_load: bool,
}

impl PassagesCache {
    /// Create an empty, clean cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `dir`, evicting records older than `max_age_days`.
    pub async fn load(dir: &Path, max_age_days: Option<f64>, now: DateTime<Utc>) -> Self {
        let mut passages: Passages = store::read_json(&dir.join(PASSAGES_FILE)).await;
        let updated_since_load = clean_passages(&mut passages, store::eviction_threshold(now, max_age_days));
        if updated_since_load {
            tracing::info!("Evicted stale passages from {}", dir.display());
        }
        Self {
            passages,
            updated_since_load,
        }
    }

    /// Persist if dirty; returns whether anything was written.
    pub async fn save(&mut self, dir: &Path) -> Result<bool> {
        if !self.updated_since_load {
            return Ok(false);
        }
        store::write_json(&dir.join(PASSAGES_FILE), &self.passages).await?;
        self.updated_since_load = false;
        tracing::info!("Saved passage cache to {}", dir.display());
        Ok(true)
    }

    /// Whether there are unsaved changes
    pub const fn is_dirty(&self) -> bool {
        self.updated_since_load
    }

    /// First stored response whose query equals `query` exactly.
    pub fn lookup(&self, passage_id: &str, bible_abbreviation: &str, query: &PassageQuery) -> Option<&PassageAndFums> {
        self.passages
            .get(&passage_key(passage_id, bible_abbreviation))?
            .iter()
            .find(|p| p.query == *query)
            .map(|p| &p.response)
    }

    /// Store a fetched response and mark the cache dirty.
    pub fn append(
        &mut self,
        bible_abbreviation: &str,
        query: PassageQuery,
        response: PassageAndFums,
        now: DateTime<Utc>,
    ) {
        let key = passage_key(&query.passage_id, bible_abbreviation);
        self.passages.entry(key).or_default().push(CachedPassage {
            query,
            response,
            cached_on: now,
        });
        self.updated_since_load = true;
    }
}
