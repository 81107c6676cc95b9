//! In-memory `BibleApi` used by unit tests.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Map;

use crate::api_bible::types::{
    BibleResponse, BookResponse, FumsResponse, LanguageResponse, PassageAndFums, PassageOptions,
    PassageResponse, ScriptDirection,
};
use crate::api_bible::BibleApi;
use crate::error::{Error, FetchContext, Result};

pub const KJV_ID: &str = "de4e12af7f28f599-02";
pub const KJVA_ID: &str = "de4e12af7f28f599-01";
pub const BSB_ID: &str = "bba9f40183526463-01";
pub const SVD_ID: &str = "b17e246951402e50-01";

const ENGLISH_BOOKS: &[(&str, &str, &str)] = &[
    ("GEN", "Genesis", "Gen"),
    ("1SA", "1 Samuel", "1Sam"),
    ("1KI", "1 Kings", "1Kgs"),
    ("JHN", "John", "Jhn"),
];

const ARABIC_BOOKS: &[(&str, &str, &str)] = &[
    ("GEN", "التكوين", "تك"),
    ("JHN", "إنجيل يوحنا", "يو"),
];

fn language(id: &str, name: &str, direction: ScriptDirection) -> LanguageResponse {
    LanguageResponse {
        id: id.into(),
        name: name.into(),
        name_local: name.into(),
        script: String::new(),
        script_direction: Some(direction),
    }
}

fn bible(id: &str, abbreviation: &str, local: &str, language: LanguageResponse) -> BibleResponse {
    BibleResponse {
        id: id.into(),
        abbreviation: abbreviation.into(),
        abbreviation_local: local.into(),
        name: local.into(),
        name_local: local.into(),
        language,
        extra: Map::new(),
    }
}

fn books(bible_id: &str, names: &[(&str, &str, &str)]) -> Vec<BookResponse> {
    names
        .iter()
        .map(|(id, name, abbreviation)| BookResponse {
            id: (*id).into(),
            bible_id: bible_id.into(),
            abbreviation: (*abbreviation).into(),
            name: (*name).into(),
            name_long: (*name).into(),
        })
        .collect()
}

/// Canned bibles and books with call counters.
pub struct FakeBibleApi {
    bibles: Vec<BibleResponse>,
    books: BTreeMap<String, Vec<BookResponse>>,
    failing_languages: Vec<String>,
    bible_calls: AtomicUsize,
    book_calls: AtomicUsize,
    passage_calls: AtomicUsize,
}

impl FakeBibleApi {
    /// KJV, KJVA (with Judith), and BSB in English; SVD in Arabic.
    pub fn standard() -> Self {
        let eng = || language("eng", "English", ScriptDirection::Ltr);
        let arb = language("arb", "Arabic", ScriptDirection::Rtl);

        let mut kjva = books(KJVA_ID, ENGLISH_BOOKS);
        kjva.extend(books(KJVA_ID, &[("JDT", "Judith", "Jdt")]));

        let mut book_map = BTreeMap::new();
        book_map.insert(KJV_ID.to_string(), books(KJV_ID, ENGLISH_BOOKS));
        book_map.insert(KJVA_ID.to_string(), kjva);
        book_map.insert(BSB_ID.to_string(), books(BSB_ID, ENGLISH_BOOKS));
        book_map.insert(SVD_ID.to_string(), books(SVD_ID, ARABIC_BOOKS));

        Self {
            bibles: vec![
                bible(KJV_ID, "engKJV", "KJV", eng()),
                bible(KJVA_ID, "engKJVA", "KJVA", eng()),
                bible(BSB_ID, "BSB", "BSB", eng()),
                bible(SVD_ID, "arbSVD", "SVD", arb),
            ],
            books: book_map,
            failing_languages: Vec::new(),
            bible_calls: AtomicUsize::new(0),
            book_calls: AtomicUsize::new(0),
            passage_calls: AtomicUsize::new(0),
        }
    }

    /// Make bible listings for `language` fail with a 400.
    pub fn failing_language(mut self, language: &str) -> Self {
        self.failing_languages.push(language.to_string());
        self
    }

    pub fn bible_calls(&self) -> usize {
        self.bible_calls.load(Ordering::SeqCst)
    }

    pub fn book_calls(&self) -> usize {
        self.book_calls.load(Ordering::SeqCst)
    }

    pub fn passage_calls(&self) -> usize {
        self.passage_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BibleApi for FakeBibleApi {
    async fn fetch_bibles(&self, language: Option<&str>) -> Result<Vec<BibleResponse>> {
        self.bible_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(language) = language {
            if self.failing_languages.iter().any(|l| l == language) {
                return Err(Error::api_status(
                    FetchContext::Bibles {
                        language: Some(language.to_string()),
                    },
                    400,
                    "Bad Request",
                ));
            }
        }
        Ok(self
            .bibles
            .iter()
            .filter(|b| language.map_or(true, |l| b.language.id == l))
            .cloned()
            .collect())
    }

    async fn fetch_books(&self, bible_id: &str) -> Result<Vec<BookResponse>> {
        self.book_calls.fetch_add(1, Ordering::SeqCst);
        self.books.get(bible_id).cloned().ok_or_else(|| {
            Error::api_status(
                FetchContext::Books {
                    bible_id: bible_id.to_string(),
                },
                404,
                "Not Found",
            )
        })
    }

    async fn fetch_passage(
        &self,
        passage_id: &str,
        bible_id: &str,
        options: &PassageOptions,
    ) -> Result<PassageAndFums> {
        self.passage_calls.fetch_add(1, Ordering::SeqCst);
        if !self.books.contains_key(bible_id) {
            return Err(Error::api_status(
                FetchContext::Passage {
                    passage_id: passage_id.to_string(),
                    bible_id: bible_id.to_string(),
                },
                404,
                "Not Found",
            ));
        }
        Ok(PassageAndFums {
            data: PassageResponse {
                id: passage_id.to_string(),
                reference: passage_id.to_string(),
                content: format!("{passage_id} in {bible_id} as {}", options.content_type.as_str()).into(),
                copyright: "PUBLIC DOMAIN".into(),
                extra: Map::new(),
            },
            meta: FumsResponse::default(),
        })
    }
}
