//! `Ephrem` - scripture citations to API.Bible passages.
//!
//! This crate turns free-text citations such as `John 3:16-20 (KJV, NIV)`
//! into canonical passage ids, fetches the passages from API.Bible, and keeps
//! bibles, book names, and passages in an on-disk JSON cache.

// Re-export public modules for use in integration tests and as a library
pub mod api_bible;
pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod passage;
pub mod reference;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use api_bible::{ApiBibleClient, BibleApi, PassageOptions};
pub use config::Config;
pub use error::{Error, Result};
pub use passage::{FetchOptions, PassageGroup, ResolvedPassage};
pub use reference::{ChapterVerseRange, Reference, ResolveOptions, ResolvedGroup};
pub use session::Session;
