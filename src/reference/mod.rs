//! Scripture citation parsing and resolution.
//!
//! A citation such as `John 3:16-20 (KJV, NIV)` is split into a
//! [`ReferenceGroup`] (book name, range, bibles) and then resolved into one
//! [`Reference`] per bible, each carrying a canonical book id.

/// Canonical USFM book identifiers
pub mod book_ids;
/// Book name to canonical id resolution
pub mod identify;
/// Citation tokenizing and range splitting
pub mod parser;
/// Passage id formatting and parsing
pub mod passage_id;
/// Top-level citation resolution
pub mod resolve;

use std::fmt;

use crate::config::Config;
use crate::constants::reference::DEFAULT_DELIMITER;

pub use book_ids::{book_name, is_book_id, BOOK_IDS};
pub use identify::{get_book_id, normalize_book_name, resolve_book_id, BookResolution};
pub use parser::{parse_reference_group, split_groups, split_range};
pub use passage_id::{get_passage_id, parse_passage_id};
pub use resolve::{parse_reference, parse_references, split_reference_group, ResolvedGroup};

/// Chapter and verse bounds of a citation.
///
/// `chapter_end` is only set when the range spans chapters. `verse_end`
/// without `chapter_end` is a verse range inside `chapter_start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChapterVerseRange {
    /// First chapter.
    pub chapter_start: u32,
    /// Last chapter of a multi-chapter range.
    pub chapter_end: Option<u32>,
    /// First verse.
    pub verse_start: Option<u32>,
    /// Last verse.
    pub verse_end: Option<u32>,
}

impl ChapterVerseRange {
    /// A whole chapter.
    pub const fn chapter(chapter: u32) -> Self {
        Self {
            chapter_start: chapter,
            chapter_end: None,
            verse_start: None,
            verse_end: None,
        }
    }

    /// A single verse.
    pub const fn verse(chapter: u32, verse: u32) -> Self {
        Self {
            chapter_start: chapter,
            chapter_end: None,
            verse_start: Some(verse),
            verse_end: None,
        }
    }

    /// Check structural consistency, returning the reason on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        let values = [Some(self.chapter_start), self.chapter_end, self.verse_start, self.verse_end];
        if values.iter().flatten().any(|v| *v == 0) {
            return Err("chapter and verse numbers must be positive");
        }
        if self.verse_end.is_some() && self.verse_start.is_none() {
            return Err("a verse range needs a starting verse");
        }
        if self.is_multi_chapter() && self.verse_start.is_some() && self.verse_end.is_none() {
            return Err("a multi-chapter range starting at a verse needs an ending verse");
        }
        if self.chapter_end.is_some_and(|end| end < self.chapter_start) {
            return Err("the range ends before it starts");
        }
        if !self.is_multi_chapter() {
            if let (Some(start), Some(end)) = (self.verse_start, self.verse_end) {
                if end < start {
                    return Err("the range ends before it starts");
                }
            }
        }
        Ok(())
    }

    /// Whether the range covers more than one chapter.
    pub fn is_multi_chapter(&self) -> bool {
        self.chapter_end.is_some_and(|end| end != self.chapter_start)
    }

    /// Whether the range is exactly one verse.
    pub fn is_single_verse(&self) -> bool {
        !self.is_multi_chapter()
            && self.verse_start.is_some()
            && self.verse_end.map_or(true, |end| Some(end) == self.verse_start)
    }
}

impl fmt::Display for ChapterVerseRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chapter_start)?;
        if let Some(verse) = self.verse_start {
            write!(f, ":{verse}")?;
        }
        if self.is_single_verse() {
            return Ok(());
        }
        match (self.chapter_end.filter(|_| self.is_multi_chapter()), self.verse_end) {
            (Some(chapter), Some(verse)) => write!(f, "-{chapter}:{verse}"),
            (Some(chapter), None) => write!(f, "-{chapter}"),
            (None, Some(verse)) => write!(f, "-{verse}"),
            (None, None) => Ok(()),
        }
    }
}

/// One citation before it is resolved against its bibles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceGroup {
    /// Book name as written.
    pub book_name: String,
    /// Chapter and verse bounds.
    pub range: ChapterVerseRange,
    /// Bible abbreviations, in citation order.
    pub bibles: Vec<String>,
}

/// A fully resolved citation in one bible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Canonical book id.
    pub book: String,
    /// Chapter and verse bounds.
    pub range: ChapterVerseRange,
    /// Bible abbreviation.
    pub bible: String,
    /// Upstream bible id.
    pub bible_id: String,
}

impl Reference {
    /// Canonical passage id of this reference.
    pub fn passage_id(&self) -> String {
        get_passage_id(&self.book, &self.range)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.book, self.range, self.bible)
    }
}

/// Knobs for turning citation text into references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Languages whose bibles vote on book names.
    pub languages: Vec<String>,
    /// Bibles never added to the cache.
    pub bibles_to_exclude: Vec<String>,
    /// Bibles used when a citation names none.
    pub default_bibles: Vec<String>,
    /// Separator between citations.
    pub delimiter: String,
    /// Fall back to the majority vote when the bible has no match.
    pub use_majority_fallback: bool,
    /// Refetch bibles and books even when cached.
    pub force_update_cache: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ResolveOptions {
    /// Options from library configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            languages: config.languages.clone(),
            bibles_to_exclude: config.bibles_to_exclude.clone(),
            default_bibles: config.default_bibles.clone(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            use_majority_fallback: config.use_majority_fallback,
            force_update_cache: false,
        }
    }
}
