//! Cache refresh: fetch bibles and books from the API and merge them in.
//!
//! Requests for different languages (or different bibles) are issued
//! together and merged one by one once they all return. Successful results
//! are merged even when another request fails; the first failure is then
//! returned and the partial merge stays in the cache.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::api_bible::types::{BibleResponse, BookResponse};
use crate::api_bible::BibleApi;
use crate::cache::bibles::{BibleEntry, BiblesCache, BookNameReference, BookNames};
use crate::error::Result;
use crate::reference::identify::{normalize_book_name, normalize_language, validate_languages};
use crate::reference::{is_book_id, ResolveOptions};

/// A book name as it will be cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookNameDetails {
    /// Normalized name.
    pub name: String,
    /// Canonical book id.
    pub id: String,
    /// Whether the name is the bible's abbreviation for the book.
    pub is_abbreviation: bool,
}

/// Cache entries for one bible, keyed by its abbreviation and local abbreviation.
pub fn prepare_bible_data(bible: &BibleResponse, now: DateTime<Utc>) -> Vec<(String, BibleEntry)> {
    let entry = BibleEntry {
        id: bible.id.clone(),
        language: normalize_language(&bible.language.id),
        cached_on: now,
    };

    let mut keys = vec![bible.abbreviation.trim()];
    let local = bible.abbreviation_local.trim();
    if !local.is_empty() && !keys.contains(&local) {
        keys.push(local);
    }

    keys.into_iter()
        .filter(|k| !k.is_empty())
        .map(|k| (k.to_string(), entry.clone()))
        .collect()
}

/// Normalized names and abbreviations of the canonical books in a book list.
pub fn prepare_book_names(books: &[BookResponse]) -> Vec<BookNameDetails> {
    let mut details = Vec::new();
    for book in books.iter().filter(|b| is_book_id(&b.id)) {
        for (raw, is_abbreviation) in [(&book.name, false), (&book.abbreviation, true)] {
            let name = normalize_book_name(raw);
            if name.is_empty() {
                continue;
            }
            let detail = BookNameDetails {
                name,
                id: book.id.clone(),
                is_abbreviation,
            };
            if !details.contains(&detail) {
                details.push(detail);
            }
        }
    }
    details
}

/// Record that `bible` uses `details.name` for `details.id`.
///
/// The first reference that either has the same (id, language, abbreviation)
/// triple or is already backed by `bible` decides: a triple match gains the
/// bible, anything else is left alone. With no such reference a new one is
/// added. Returns whether anything changed.
pub fn merge_book_name(
    book_names: &mut BookNames,
    details: &BookNameDetails,
    language: &str,
    bible: &str,
    now: DateTime<Utc>,
) -> bool {
    let references = book_names.entry(details.name.clone()).or_default();

    match references
        .iter_mut()
        .find(|r| r.matches(&details.id, language, details.is_abbreviation) || r.has_bible(bible))
    {
        Some(reference) if !reference.has_bible(bible) => {
            reference.bibles.push(bible.to_string());
            true
        }
        Some(_) => false,
        None => {
            references.push(BookNameReference {
                id: details.id.clone(),
                language: language.to_string(),
                is_abbreviation: details.is_abbreviation,
                bibles: vec![bible.to_string()],
                cached_on: now,
            });
            true
        }
    }
}

/// Fetch the bibles of each language and merge them, skipping excluded abbreviations.
///
/// An empty language list fetches every bible the key can see.
pub async fn update_bibles(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    languages: &[String],
    bibles_to_exclude: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let languages = validate_languages(languages)?;

    let responses = if languages.is_empty() {
        vec![api.fetch_bibles(None).await]
    } else {
        join_all(languages.iter().map(|l| api.fetch_bibles(Some(l)))).await
    };

    let mut first_error = None;
    let mut merged = 0usize;
    for response in responses {
        match response {
            Ok(bibles) => {
                for bible in &bibles {
                    let excluded = bibles_to_exclude
                        .iter()
                        .any(|x| *x == bible.abbreviation || *x == bible.abbreviation_local);
                    if excluded {
                        continue;
                    }
                    for (abbreviation, entry) in prepare_bible_data(bible, now) {
                        cache.bibles.insert(abbreviation, entry);
                        merged += 1;
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Bible listing failed: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    if merged > 0 {
        cache.mark_dirty();
    }
    tracing::info!("Cached {merged} bible abbreviations for {languages:?}");
    first_error.map_or(Ok(()), Err)
}

/// Fetch the book lists of every cached bible in `languages` and merge their names.
///
/// Each upstream bible is fetched once even when several abbreviations point at it.
pub async fn update_book_names(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    languages: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let languages = validate_languages(languages)?;

    // bible id -> (language, abbreviations)
    let mut targets: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();
    for (abbreviation, bible) in &cache.bibles {
        if languages.is_empty() || languages.contains(&bible.language) {
            targets
                .entry(bible.id.clone())
                .or_insert_with(|| (bible.language.clone(), Vec::new()))
                .1
                .push(abbreviation.clone());
        }
    }

    let responses = join_all(targets.keys().map(|id| api.fetch_books(id))).await;

    let mut first_error = None;
    let mut changed = false;
    for ((bible_id, (language, abbreviations)), response) in targets.iter().zip(responses) {
        match response {
            Ok(books) => {
                let details = prepare_book_names(&books);
                for abbreviation in abbreviations {
                    for detail in &details {
                        changed |= merge_book_name(&mut cache.book_names, detail, language, abbreviation, now);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Book listing for bible {bible_id} failed: {e}");
                first_error.get_or_insert(e);
            }
        }
    }

    if changed {
        cache.mark_dirty();
    }
    tracing::info!("Cached book names of {} bibles", targets.len());
    first_error.map_or(Ok(()), Err)
}

/// Fetch bibles then books for every language not yet cached, or all of them when forced.
pub async fn update_cache(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    force: bool,
    languages: &[String],
    bibles_to_exclude: &[String],
    now: DateTime<Utc>,
) -> Result<()> {
    let languages = validate_languages(languages)?;
    let to_update: Vec<String> = if force {
        languages
    } else {
        languages
            .into_iter()
            .filter(|l| !cache.language_in_cache(l))
            .collect()
    };

    if to_update.is_empty() {
        return Ok(());
    }

    tracing::info!("Refreshing bible cache for {to_update:?}");
    update_bibles(cache, api, &to_update, bibles_to_exclude, now).await?;
    update_book_names(cache, api, &to_update, now).await
}

/// Refresh when forced or when the cache lacks `bible` or any requested language.
pub async fn refresh_if_needed(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    bible: Option<&str>,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<()> {
    let languages = validate_languages(&options.languages)?;
    if options.force_update_cache || cache.needs_update(bible, &languages) {
        update_cache(
            cache,
            api,
            options.force_update_cache,
            &languages,
            &options.bibles_to_exclude,
            now,
        )
        .await?;
    }
    Ok(())
}
