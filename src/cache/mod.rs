//! On-disk JSON caches.
//!
//! Two files back the bible cache (`bibles.json`, `book-names.json`) and one
//! backs the passage cache (`passages.json`). Entries older than the
//! configured age are evicted on load, and a cache is only written back when
//! something changed since it was loaded.

/// Bible abbreviations and book names
pub mod bibles;
/// Fetched passage responses
pub mod passages;
/// Fetch-and-merge from API.Bible
pub mod refresh;
/// JSON file I/O, timestamps, eviction
pub mod store;

pub use bibles::{BibleEntry, BiblesCache, BookNameReference};
pub use passages::{CachedPassage, PassageQuery, PassagesCache};
pub use refresh::{update_cache, refresh_if_needed};
