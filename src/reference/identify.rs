//! Book identity resolution.
//!
//! Book names are matched after normalization (punctuation stripped,
//! lowercased), so the lookup works the same for Latin, Arabic, or any other
//! script. A name is resolved first against the target bible, then, if
//! allowed, by a majority vote over every cached bible using that name.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::api_bible::BibleApi;
use crate::cache::bibles::BiblesCache;
use crate::cache::refresh;
use crate::error::{Error, Result};
use crate::reference::{is_book_id, ResolveOptions};

#[allow(clippy::expect_used)]
static RE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\p{P}").expect("valid regex: RE_PUNCTUATION"));

#[allow(clippy::expect_used)]
static RE_LANGUAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{3}$").expect("valid regex: RE_LANGUAGE_ID"));

/// Outcome of resolving a book name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookResolution {
    /// The canonical book id.
    Found(String),
    /// No canonical book matches the name.
    NotFound,
}

impl BookResolution {
    /// The id, if one was found.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Found(id) => Some(id),
            Self::NotFound => None,
        }
    }
}

impl From<Option<String>> for BookResolution {
    fn from(id: Option<String>) -> Self {
        id.filter(|id| is_book_id(id)).map_or(Self::NotFound, Self::Found)
    }
}

/// Strip Unicode punctuation and lowercase.
pub fn normalize_book_name(name: &str) -> String {
    RE_PUNCTUATION.replace_all(name, "").trim().to_lowercase()
}

/// Strip punctuation, trim, and lowercase a language id.
pub fn normalize_language(language: &str) -> String {
    RE_PUNCTUATION.replace_all(language, "").trim().to_lowercase()
}

/// Normalize a language id and check it is ISO 639-3 shaped.
pub fn validate_language(language: &str) -> Result<String> {
    let normalized = normalize_language(language);
    if RE_LANGUAGE_ID.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(Error::InvalidLanguageId {
            language: language.to_string(),
        })
    }
}

/// Validate every language id, keeping order and dropping duplicates.
pub fn validate_languages(languages: &[String]) -> Result<Vec<String>> {
    let mut validated: Vec<String> = Vec::with_capacity(languages.len());
    for language in languages {
        let language = validate_language(language)?;
        if !validated.contains(&language) {
            validated.push(language);
        }
    }
    Ok(validated)
}

/// Id of the first reference for `name` used by `bible`.
pub fn book_id_in_bible<'a>(cache: &'a BiblesCache, name: &str, bible: &str) -> Option<&'a str> {
    cache
        .book_names
        .get(name)?
        .iter()
        .find(|r| r.has_bible(bible))
        .map(|r| r.id.as_str())
}

/// Id backed by the most bibles among references in `languages`.
///
/// Each reference adds one vote per bible to its id; an empty language list
/// counts every reference. Ties go to the id seen first.
pub fn book_id_by_majority(cache: &BiblesCache, name: &str, languages: &[String]) -> Option<String> {
    let references = cache.book_names.get(name)?;

    let mut tally: Vec<(&str, usize)> = Vec::new();
    for reference in references {
        if !languages.is_empty() && !languages.contains(&reference.language) {
            continue;
        }
        match tally.iter_mut().find(|(id, _)| *id == reference.id) {
            Some((_, votes)) => *votes += reference.bibles.len(),
            None => tally.push((reference.id.as_str(), reference.bibles.len())),
        }
    }

    let mut winner: Option<(&str, usize)> = None;
    for (id, votes) in tally {
        if winner.map_or(true, |(_, best)| votes > best) {
            winner = Some((id, votes));
        }
    }
    winner.map(|(id, _)| id.to_string())
}

/// Resolve a book name against an already prepared cache.
///
/// With a target bible, that bible's own name table is consulted first. The
/// majority vote runs when there is no target bible or when
/// `use_majority_fallback` allows it.
pub fn resolve_book_id(
    cache: &BiblesCache,
    book_name: &str,
    bible: Option<&str>,
    languages: &[String],
    use_majority_fallback: bool,
) -> BookResolution {
    let name = normalize_book_name(book_name);
    if !cache.book_names.contains_key(&name) {
        return BookResolution::NotFound;
    }

    let direct = bible.and_then(|bible| book_id_in_bible(cache, &name, bible));
    if let Some(id) = direct {
        return Some(id.to_string()).into();
    }

    if use_majority_fallback || bible.is_none() {
        return book_id_by_majority(cache, &name, languages).into();
    }
    BookResolution::NotFound
}

/// Resolve a book name, refreshing the cache first when it lacks the bible
/// or any requested language.
pub async fn get_book_id(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    book_name: &str,
    bible: Option<&str>,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<BookResolution> {
    let languages = validate_languages(&options.languages)?;
    refresh::refresh_if_needed(cache, api, bible, options, now).await?;

    let resolution = resolve_book_id(cache, book_name, bible, &languages, options.use_majority_fallback);
    tracing::debug!("Resolved book {book_name:?} ({bible:?}) to {resolution:?}");
    Ok(resolution)
}
