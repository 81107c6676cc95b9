//! Passage retrieval through the passage cache.
//!
//! Citations are resolved first, then each reference is served from the
//! passage cache when an identical query was stored before. Misses within a
//! citation are fetched together and appended to the cache as they land.

use chrono::{DateTime, Utc};
use futures::future::join_all;

use crate::api_bible::types::{PassageAndFums, PassageOptions};
use crate::api_bible::BibleApi;
use crate::cache::bibles::BiblesCache;
use crate::cache::passages::{PassageQuery, PassagesCache};
use crate::cache::refresh;
use crate::error::{Error, Result};
use crate::reference::{parse_references, Reference, ResolveOptions};

/// How passage content is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchOptions {
    /// Formatting flags sent upstream and stored with the response.
    pub passage: PassageOptions,
    /// Skip the passage cache lookup and always fetch.
    pub force_fetch: bool,
}

impl FetchOptions {
    /// Cache-first fetching with the given formatting.
    pub const fn new(passage: PassageOptions) -> Self {
        Self {
            passage,
            force_fetch: false,
        }
    }
}

/// One reference and its passage.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPassage {
    /// The resolved reference.
    pub reference: Reference,
    /// Canonical passage id.
    pub passage_id: String,
    /// The upstream response.
    pub passage: PassageAndFums,
}

/// One citation from the input and its passages, one per bible.
#[derive(Debug, Clone, PartialEq)]
pub struct PassageGroup {
    /// The citation text as written.
    pub citation: String,
    /// Passages, in bible order.
    pub passages: Vec<ResolvedPassage>,
}

/// Upstream id of a bible abbreviation, refreshing the cache if it is unknown.
pub async fn get_bible_id(
    cache: &mut BiblesCache,
    api: &dyn BibleApi,
    bible: &str,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<String> {
    refresh::refresh_if_needed(cache, api, Some(bible), options, now).await?;
    cache
        .bibles
        .get(bible)
        .map(|entry| entry.id.clone())
        .ok_or_else(|| Error::BibleNotAvailable {
            abbreviation: bible.to_string(),
        })
}

/// Passage `passage_id` in `bible`, from the cache when possible.
#[allow(clippy::too_many_arguments)]
pub async fn prepare_passage(
    bibles: &mut BiblesCache,
    passages: &mut PassagesCache,
    api: &dyn BibleApi,
    passage_id: &str,
    bible: &str,
    fetch: &FetchOptions,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<PassageAndFums> {
    let bible_id = get_bible_id(bibles, api, bible, options, now).await?;
    let query = PassageQuery {
        passage_id: passage_id.to_string(),
        bible_id,
        options: fetch.passage,
    };

    if !fetch.force_fetch {
        if let Some(cached) = passages.lookup(passage_id, bible, &query) {
            tracing::debug!("Passage cache hit: {passage_id}@{bible}");
            return Ok(cached.clone());
        }
    }

    let response = api.fetch_passage(&query.passage_id, &query.bible_id, &query.options).await?;
    passages.append(bible, query, response.clone(), now);
    Ok(response)
}

fn query_for(reference: &Reference, options: PassageOptions) -> PassageQuery {
    PassageQuery {
        passage_id: reference.passage_id(),
        bible_id: reference.bible_id.clone(),
        options,
    }
}

/// Resolve every citation in `input` and return its passages.
///
/// Successful fetches are cached even when another fetch in the same
/// citation fails; the first failure is then returned.
pub async fn get_passages(
    bibles: &mut BiblesCache,
    passages: &mut PassagesCache,
    api: &dyn BibleApi,
    input: &str,
    fetch: &FetchOptions,
    options: &ResolveOptions,
    now: DateTime<Utc>,
) -> Result<Vec<PassageGroup>> {
    let groups = parse_references(bibles, api, input, options, now).await?;

    let mut result = Vec::with_capacity(groups.len());
    for group in groups {
        let queries: Vec<PassageQuery> = group
            .references
            .iter()
            .map(|r| query_for(r, fetch.passage))
            .collect();

        let mut found: Vec<Option<PassageAndFums>> = queries
            .iter()
            .zip(&group.references)
            .map(|(query, reference)| {
                if fetch.force_fetch {
                    return None;
                }
                passages.lookup(&query.passage_id, &reference.bible, query).cloned()
            })
            .collect();

        let misses: Vec<usize> = found
            .iter()
            .enumerate()
            .filter(|(_, passage)| passage.is_none())
            .map(|(i, _)| i)
            .collect();
        if !misses.is_empty() {
            tracing::debug!("Fetching {} passages for {:?}", misses.len(), group.citation);
        }
        let responses = join_all(misses.iter().map(|&i| {
            let query = &queries[i];
            api.fetch_passage(&query.passage_id, &query.bible_id, &query.options)
        }))
        .await;

        let mut first_error = None;
        for (i, response) in misses.into_iter().zip(responses) {
            match response {
                Ok(response) => {
                    passages.append(&group.references[i].bible, queries[i].clone(), response.clone(), now);
                    found[i] = Some(response);
                }
                Err(e) => {
                    tracing::warn!("Passage fetch failed: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let resolved = group
            .references
            .into_iter()
            .zip(queries)
            .zip(found)
            .filter_map(|((reference, query), passage)| {
                passage.map(|passage| ResolvedPassage {
                    reference,
                    passage_id: query.passage_id,
                    passage,
                })
            })
            .collect();
        result.push(PassageGroup {
            citation: group.citation,
            passages: resolved,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::api_bible::types::ContentType;
    use crate::test_support::{FakeBibleApi, BSB_ID, KJV_ID};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn options() -> ResolveOptions {
        ResolveOptions {
            languages: vec!["eng".into()],
            bibles_to_exclude: Vec::new(),
            default_bibles: vec!["KJV".into()],
            delimiter: ";".into(),
            use_majority_fallback: true,
            force_update_cache: false,
        }
    }

    #[tokio::test]
    async fn test_get_passages_uses_cache() {
        let api = FakeBibleApi::standard();
        let mut bibles = BiblesCache::new();
        let mut passages = PassagesCache::new();
        let fetch = FetchOptions::default();

        let groups = get_passages(&mut bibles, &mut passages, &api, "John 3:16 (KJV, BSB)", &fetch, &options(), now())
            .await
            .unwrap();
        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        assert_eq!(group.passages.len(), 2);
        assert_eq!(group.passages[0].passage_id, "JHN.3.16");
        assert_eq!(group.passages[0].passage.data.content, format!("JHN.3.16 in {KJV_ID} as text"));
        assert_eq!(group.passages[1].passage.data.content, format!("JHN.3.16 in {BSB_ID} as text"));
        assert_eq!(api.passage_calls(), 2);
        assert!(passages.is_dirty());

        let again = get_passages(&mut bibles, &mut passages, &api, "John 3:16 (KJV, BSB)", &fetch, &options(), now())
            .await
            .unwrap();
        assert_eq!(again, groups);
        assert_eq!(api.passage_calls(), 2);
    }

    #[tokio::test]
    async fn test_different_options_miss_the_cache() {
        let api = FakeBibleApi::standard();
        let mut bibles = BiblesCache::new();
        let mut passages = PassagesCache::new();

        get_passages(&mut bibles, &mut passages, &api, "John 3:16", &FetchOptions::default(), &options(), now())
            .await
            .unwrap();

        let html = FetchOptions::new(PassageOptions {
            content_type: ContentType::Html,
            ..PassageOptions::default()
        });
        let groups = get_passages(&mut bibles, &mut passages, &api, "John 3:16", &html, &options(), now())
            .await
            .unwrap();
        assert_eq!(api.passage_calls(), 2);
        assert_eq!(groups[0].passages[0].passage.data.content, format!("JHN.3.16 in {KJV_ID} as html"));
        assert_eq!(passages.passages["JHN.3.16@KJV"].len(), 2);
    }

    #[tokio::test]
    async fn test_force_fetch_skips_lookup() {
        let api = FakeBibleApi::standard();
        let mut bibles = BiblesCache::new();
        let mut passages = PassagesCache::new();
        let forced = FetchOptions {
            force_fetch: true,
            ..FetchOptions::default()
        };

        for _ in 0..2 {
            prepare_passage(&mut bibles, &mut passages, &api, "JHN.3.16", "KJV", &forced, &options(), now())
                .await
                .unwrap();
        }
        assert_eq!(api.passage_calls(), 2);
    }

    #[tokio::test]
    async fn test_prepare_passage_caches_response() {
        let api = FakeBibleApi::standard();
        let mut bibles = BiblesCache::new();
        let mut passages = PassagesCache::new();
        let fetch = FetchOptions::default();

        let first = prepare_passage(&mut bibles, &mut passages, &api, "GEN.1", "engKJV", &fetch, &options(), now())
            .await
            .unwrap();
        let second = prepare_passage(&mut bibles, &mut passages, &api, "GEN.1", "engKJV", &fetch, &options(), now())
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(api.passage_calls(), 1);
        assert!(passages.passages.contains_key("GEN.1@engKJV"));
    }

    #[tokio::test]
    async fn test_unknown_bible_is_not_available() {
        let api = FakeBibleApi::standard();
        let mut bibles = BiblesCache::new();
        let mut passages = PassagesCache::new();

        let result = prepare_passage(
            &mut bibles,
            &mut passages,
            &api,
            "JHN.3.16",
            "XYZ",
            &FetchOptions::default(),
            &options(),
            now(),
        )
        .await;
        assert!(matches!(result, Err(Error::BibleNotAvailable { .. })));
        assert_eq!(api.passage_calls(), 0);
    }
}
