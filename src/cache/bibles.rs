//! Bible and book-name cache.
//!
//! Two maps persisted side by side: bible abbreviation to upstream bible id,
//! and normalized book name to every canonical book that name denotes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::store::{self, timestamp};
use crate::constants::cache::{BIBLES_FILE, BOOK_NAMES_FILE};
use crate::error::Result;

/// One bible known to the upstream service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleEntry {
    /// Opaque upstream bible id.
    pub id: String,
    /// ISO 639-3 language id.
    pub language: String,
    /// When the entry was fetched.
    #[serde(with = "timestamp")]
    pub cached_on: DateTime<Utc>,
}

/// One meaning of a normalized book name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookNameReference {
    /// Canonical book id.
    pub id: String,
    /// ISO 639-3 language id of the bibles using this name.
    pub language: String,
    /// Whether the name is the bible's short form of the book.
    pub is_abbreviation: bool,
    /// Abbreviations of the bibles that use this name for this book.
    pub bibles: Vec<String>,
    /// When the reference was first recorded.
    #[serde(with = "timestamp")]
    pub cached_on: DateTime<Utc>,
}

impl BookNameReference {
    /// Whether this reference has the given identity triple.
    pub fn matches(&self, book_id: &str, language: &str, is_abbreviation: bool) -> bool {
        self.id == book_id && self.language == language && self.is_abbreviation == is_abbreviation
    }

    /// Whether `bible` uses this name.
    pub fn has_bible(&self, bible: &str) -> bool {
        self.bibles.iter().any(|b| b == bible)
    }
}

/// Bible abbreviation to bible entry.
pub type Bibles = BTreeMap<String, BibleEntry>;

/// Normalized book name to its references.
pub type BookNames = BTreeMap<String, Vec<BookNameReference>>;

/// Drop bibles cached before `threshold`; reports whether anything was removed.
pub fn clean_bibles(bibles: &mut Bibles, threshold: Option<DateTime<Utc>>) -> bool {
    let before = bibles.len();
    bibles.retain(|_, bible| store::is_fresh(bible.cached_on, threshold));
    bibles.len() != before
}

/// Drop stale references, then names with no references left.
pub fn clean_book_names(book_names: &mut BookNames, threshold: Option<DateTime<Utc>>) -> bool {
    let mut removed = false;
    book_names.retain(|_, references| {
        let before = references.len();
        references.retain(|r| store::is_fresh(r.cached_on, threshold));
        removed |= references.len() != before;
        !references.is_empty()
    });
    removed
}

/// In-memory bible and book-name cache with dirty tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BiblesCache {
    /// Bible abbreviation to bible entry.
    pub bibles: Bibles,
    /// Normalized book name to references.
    pub book_names: BookNames,
    updated_since_load: bool,
}

impl BiblesCache {
    /// Create an empty, clean cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cache from maps, marking it clean
    pub fn from_parts(bibles: Bibles, book_names: BookNames) -> Self {
        Self {
            bibles,
            book_names,
            updated_since_load: false,
        }
    }

    /// Load both stores from `dir`, evicting entries older than `max_age_days`.
    ///
    /// Eviction marks the cache dirty so the next save persists it.
    pub async fn load(dir: &Path, max_age_days: Option<f64>, now: DateTime<Utc>) -> Self {
        let bibles: Bibles = store::read_json(&dir.join(BIBLES_FILE)).await;
        let book_names: BookNames = store::read_json(&dir.join(BOOK_NAMES_FILE)).await;

        let mut cache = Self::from_parts(bibles, book_names);
        let evicted = cache.clean(store::eviction_threshold(now, max_age_days));
        if evicted {
            tracing::info!("Evicted stale bible cache entries from {}", dir.display());
        }
        tracing::debug!(
            "Loaded {} bibles and {} book names",
            cache.bibles.len(),
            cache.book_names.len()
        );
        cache
    }

    /// Persist both stores if anything changed since load.
    ///
    /// Both files are attempted; the dirty flag clears only when both writes
    /// succeed. Returns whether anything was written.
    pub async fn save(&mut self, dir: &Path) -> Result<bool> {
        if !self.updated_since_load {
            return Ok(false);
        }

        let bibles = store::write_json(&dir.join(BIBLES_FILE), &self.bibles).await;
        let book_names = store::write_json(&dir.join(BOOK_NAMES_FILE), &self.book_names).await;

        match (bibles, book_names) {
            (Ok(()), Ok(())) => {
                self.updated_since_load = false;
                tracing::info!("Saved bible cache to {}", dir.display());
                Ok(true)
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!("Bible cache only partially saved: {e}");
                Err(e)
            }
        }
    }

    /// Evict entries cached before `threshold`, marking the cache dirty if any went.
    pub fn clean(&mut self, threshold: Option<DateTime<Utc>>) -> bool {
        let bibles = clean_bibles(&mut self.bibles, threshold);
        let book_names = clean_book_names(&mut self.book_names, threshold);
        if bibles || book_names {
            self.updated_since_load = true;
        }
        bibles || book_names
    }

    /// Whether there are unsaved changes
    pub const fn is_dirty(&self) -> bool {
        self.updated_since_load
    }

    /// Record that the cache changed
    pub fn mark_dirty(&mut self) {
        self.updated_since_load = true;
    }

    /// True only when the language has both bibles and book names cached.
    pub fn language_in_cache(&self, language: &str) -> bool {
        self.bibles.values().any(|b| b.language == language)
            && self
                .book_names
                .values()
                .flatten()
                .any(|r| r.language == language)
    }

    /// Whether `bible` is missing or any of `languages` is not fully cached.
    pub fn needs_update(&self, bible: Option<&str>, languages: &[String]) -> bool {
        if bible.is_some_and(|b| !self.bibles.contains_key(b)) {
            return true;
        }
        languages.iter().any(|l| !self.language_in_cache(l))
    }

    /// Whether any cached book name maps `book_id` to `bible`.
    pub fn book_in_bible(&self, book_id: &str, bible: &str) -> bool {
        self.book_names
            .values()
            .flatten()
            .any(|r| r.id == book_id && r.has_bible(bible))
    }

    /// Canonical ids of every book cached for `bible`, sorted.
    pub fn available_book_ids(&self, bible: &str) -> Vec<String> {
        self.book_names
            .values()
            .flatten()
            .filter(|r| r.has_bible(bible))
            .map(|r| r.id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn bible(id: &str, language: &str, cached_on: DateTime<Utc>) -> BibleEntry {
        BibleEntry {
            id: id.into(),
            language: language.into(),
            cached_on,
        }
    }

    fn reference(id: &str, language: &str, bibles: &[&str], cached_on: DateTime<Utc>) -> BookNameReference {
        BookNameReference {
            id: id.into(),
            language: language.into(),
            is_abbreviation: false,
            bibles: bibles.iter().map(|b| (*b).to_string()).collect(),
            cached_on,
        }
    }

    fn sample_cache() -> BiblesCache {
        let mut bibles = Bibles::new();
        bibles.insert("KJV".into(), bible("kjv-id", "eng", now()));
        let mut book_names = BookNames::new();
        book_names.insert("john".into(), vec![reference("JHN", "eng", &["KJV"], now())]);
        BiblesCache::from_parts(bibles, book_names)
    }

    #[test]
    fn test_clean_bibles_reports_removal() {
        let threshold = store::eviction_threshold(now(), Some(30.0));
        let mut bibles = Bibles::new();
        bibles.insert("OLD".into(), bible("old", "eng", now() - Duration::days(31)));
        bibles.insert("NEW".into(), bible("new", "eng", now() - Duration::days(29)));

        assert!(clean_bibles(&mut bibles, threshold));
        assert!(bibles.contains_key("NEW"));
        assert!(!bibles.contains_key("OLD"));

        assert!(!clean_bibles(&mut bibles, threshold));
        assert_eq!(bibles.len(), 1);
    }

    #[test]
    fn test_clean_book_names_drops_empty_names() {
        let threshold = store::eviction_threshold(now(), Some(30.0));
        let stale = now() - Duration::days(40);
        let mut book_names = BookNames::new();
        book_names.insert("kings".into(), vec![
            reference("1KI", "eng", &["KJV"], stale),
            reference("1SA", "eng", &["OSB"], now()),
        ]);
        book_names.insert("judith".into(), vec![reference("JDT", "eng", &["KJVA"], stale)]);

        assert!(clean_book_names(&mut book_names, threshold));
        assert_eq!(book_names["kings"].len(), 1);
        assert_eq!(book_names["kings"][0].id, "1SA");
        assert!(!book_names.contains_key("judith"));
    }

    #[test]
    fn test_language_requires_bibles_and_book_names() {
        let mut cache = sample_cache();
        assert!(cache.language_in_cache("eng"));
        assert!(!cache.language_in_cache("arb"));

        cache.bibles.insert("SVD".into(), bible("svd-id", "arb", now()));
        assert!(!cache.language_in_cache("arb"));
    }

    #[test]
    fn test_needs_update() {
        let cache = sample_cache();
        let eng = vec!["eng".to_string()];
        assert!(!cache.needs_update(Some("KJV"), &eng));
        assert!(!cache.needs_update(None, &eng));
        assert!(cache.needs_update(Some("NIV"), &eng));
        assert!(cache.needs_update(None, &["eng".to_string(), "arb".to_string()]));
    }

    #[test]
    fn test_book_in_bible() {
        let cache = sample_cache();
        assert!(cache.book_in_bible("JHN", "KJV"));
        assert!(!cache.book_in_bible("JHN", "BSB"));
        assert_eq!(cache.available_book_ids("KJV"), vec!["JHN"]);
        assert!(cache.available_book_ids("BSB").is_empty());
    }

    #[tokio::test]
    async fn test_save_only_when_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = sample_cache();

        assert!(!cache.save(dir.path()).await.unwrap());
        assert!(!dir.path().join(BIBLES_FILE).exists());

        cache.mark_dirty();
        assert!(cache.save(dir.path()).await.unwrap());
        assert!(!cache.is_dirty());
        assert!(dir.path().join(BOOK_NAMES_FILE).exists());

        let loaded = BiblesCache::load(dir.path(), Some(30.0), now()).await;
        assert_eq!(loaded, sample_cache());
    }

    #[tokio::test]
    async fn test_load_evicts_and_marks_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = sample_cache();
        cache.mark_dirty();
        cache.save(dir.path()).await.unwrap();

        let later = now() + Duration::days(31);
        let loaded = BiblesCache::load(dir.path(), Some(30.0), later).await;
        assert!(loaded.bibles.is_empty());
        assert!(loaded.book_names.is_empty());
        assert!(loaded.is_dirty());

        let kept = BiblesCache::load(dir.path(), None, later).await;
        assert_eq!(kept.bibles.len(), 1);
        assert!(!kept.is_dirty());
    }

    #[tokio::test]
    async fn test_failed_save_stays_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut cache = sample_cache();
        cache.mark_dirty();
        assert!(cache.save(&blocker.join("cache")).await.is_err());
        assert!(cache.is_dirty());
    }

    #[tokio::test]
    async fn test_partial_save_stays_dirty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(BOOK_NAMES_FILE)).unwrap();

        let mut cache = sample_cache();
        cache.mark_dirty();
        assert!(cache.save(dir.path()).await.is_err());
        assert!(dir.path().join(BIBLES_FILE).is_file());
        assert!(cache.is_dirty());
    }

    #[tokio::test]
    async fn test_load_with_zero_or_huge_age_keeps_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = sample_cache();
        cache.mark_dirty();
        cache.save(dir.path()).await.unwrap();

        let later = now() + Duration::days(365);
        for age in [Some(0.0), Some(1e9), Some(f64::MAX)] {
            let loaded = BiblesCache::load(dir.path(), age, later).await;
            assert_eq!(loaded, sample_cache());
            assert!(!loaded.is_dirty());
        }
    }
}
