//! Citation text to resolved references.

use chrono::{DateTime, Utc};

use crate::api_bible::BibleApi;
use crate::cache::bibles::BiblesCache;
use crate::error::{Error, Result};
use crate::reference::identify::{get_book_id, resolve_book_id, validate_languages, BookResolution};
use crate::reference::parser::{parse_reference_group, split_groups};
use crate::reference::{Reference, ReferenceGroup, ResolveOptions};

/// One citation from the input and its references, one per bible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedGroup {
    /// The citation text as written.
    pub citation: String,
    /// Resolved references, in bible order.
    pub references: Vec<Reference>,
}

async fn resolve_in_bible(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    group: &ReferenceGroup,
    input: &str,
    bible: &str,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<Reference> {
    let resolution = get_book_id(cache, api, &group.book_name, Some(bible), options, now).await?;

    let Some(entry) = cache.bibles.get(bible) else {
        return Err(Error::UnknownBibleAbbreviation {
            abbreviation: bible.to_string(),
        });
    };
    let bible_id = entry.id.clone();

    let not_in_bible = |book_id: String| Error::BookNotInBible {
        input: input.to_string(),
        book_id,
        bible: bible.to_string(),
        available_book_ids: cache.available_book_ids(bible),
    };

    let book = match resolution {
        BookResolution::Found(book) if cache.book_in_bible(&book, bible) => book,
        BookResolution::Found(book) => return Err(not_in_bible(book)),
        BookResolution::NotFound => {
            // Tell "no such book" apart from "book missing from this bible"
            let languages = validate_languages(&options.languages)?;
            return match resolve_book_id(cache, &group.book_name, None, &languages, true) {
                BookResolution::Found(book) if !cache.book_in_bible(&book, bible) => Err(not_in_bible(book)),
                _ => Err(Error::BookNotFound {
                    book_name: group.book_name.clone(),
                    bible: Some(bible.to_string()),
                }),
            };
        }
    };

    Ok(Reference {
        book,
        range: group.range,
        bible: bible.to_string(),
        bible_id,
    })
}

/// Resolve a parsed citation against each of its bibles, in order.
pub async fn split_reference_group(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    group: &ReferenceGroup,
    input: &str,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<Vec<Reference>> {
    let mut references = Vec::with_capacity(group.bibles.len());
    for bible in &group.bibles {
        references.push(resolve_in_bible(cache, api, group, input, bible, options, now).await?);
    }
    Ok(references)
}

/// Resolve every delimited citation in `input`, in input order.
pub async fn parse_references(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    input: &str,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<Vec<ResolvedGroup>> {
    let mut resolved = Vec::new();
    for citation in split_groups(input, &options.delimiter)? {
        let group = parse_reference_group(&citation, &options.default_bibles)?;
        let references = split_reference_group(cache, api, &group, &citation, options, now).await?;
        tracing::debug!("{citation:?} resolved to {} references", references.len());
        resolved.push(ResolvedGroup {
            citation,
            references,
        });
    }
    Ok(resolved)
}

/// Resolve a single citation in its first bible.
pub async fn parse_reference(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    input: &str,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<Reference> {
    let group = parse_reference_group(input.trim(), &options.default_bibles)?;
    let bible = group.bibles.first().cloned().ok_or_else(|| Error::FallbackBibleNotFound {
        input: input.to_string(),
    })?;
    resolve_in_bible(cache, api, &group, input, &bible, options, now).await
}
