//! Citation tokenizer and range splitter.
//!
//! Grammar: `<book name> <chapter>[:<verse>][-[<chapter>:]<verse or chapter>] [(<BIBLE>, ...)]`.
//! The book name may be in any script; the boundary between name and
//! locator is the first run of whitespace followed by an ASCII digit.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::reference::RESERVED_DELIMITERS;
use crate::error::{Error, Result};
use crate::reference::{ChapterVerseRange, ReferenceGroup};

/// Parenthesized bible list, e.g. `(KJV, NIV)`.
#[allow(clippy::expect_used)]
static RE_TRANSLATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid regex: RE_TRANSLATIONS"));

/// Whitespace followed by a digit, separating book name from locator.
#[allow(clippy::expect_used)]
static RE_LOCATOR_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[0-9]").expect("valid regex: RE_LOCATOR_BOUNDARY"));

/// Split multi-citation input on `delimiter`, dropping empty segments.
pub fn split_groups(input: &str, delimiter: &str) -> Result<Vec<String>> {
    if delimiter.is_empty() || RESERVED_DELIMITERS.contains(&delimiter) {
        return Err(Error::InvalidDelimiter {
            delimiter: delimiter.to_string(),
        });
    }

    Ok(input
        .split(delimiter)
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(String::from)
        .collect())
}

/// Separate the parenthesized bible list from the book and locator text.
fn extract_translations(input: &str) -> Result<(Option<Vec<String>>, String)> {
    let (translations, book_chapter_verse) = match RE_TRANSLATIONS.captures(input) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let list = caps.get(1).map_or("", |m| m.as_str());
            let bibles: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from)
                .collect();
            let rest = format!("{}{}", &input[..whole.start], &input[whole.end..]);
            ((!bibles.is_empty()).then_some(bibles), rest)
        }
        None => (None, input.to_string()),
    };

    if let (Some(hyphen), Some(colon)) = (book_chapter_verse.find('-'), book_chapter_verse.find(':')) {
        if hyphen < colon {
            return Err(Error::invalid_reference(
                input,
                "a range must start with chapter:verse when it ends with one",
            ));
        }
    }

    Ok((translations, book_chapter_verse))
}

/// Split text into book name and numeric locator.
fn split_book_and_locator<'a>(input: &str, text: &'a str) -> Result<(&'a str, &'a str)> {
    let text = text.trim();
    let mut boundaries = RE_LOCATOR_BOUNDARY.find_iter(text);

    let Some(first) = boundaries.next() else {
        return Err(Error::invalid_reference(input, "missing chapter"));
    };
    let book_name = text[..first.start()].trim();
    // The match ends just past a single-byte ASCII digit
    let locator_start = first.end() - 1;
    let locator_end = boundaries.next().map_or(text.len(), |m| m.start());
    let locator = text[locator_start..locator_end].trim();

    if book_name.is_empty() || locator.is_empty() {
        return Err(Error::invalid_reference(input, "missing book name or chapter"));
    }
    Ok((book_name, locator))
}

fn parse_number(input: &str, value: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(Error::invalid_reference(
            input,
            format!("{value:?} is not a positive chapter or verse number"),
        )),
    }
}

fn parse_chapter_verse(input: &str, value: &str) -> Result<(u32, u32)> {
    match value.split(':').collect::<Vec<_>>().as_slice() {
        [chapter, verse] => Ok((parse_number(input, chapter)?, parse_number(input, verse)?)),
        _ => Err(Error::invalid_reference(
            input,
            format!("{value:?} is not chapter:verse"),
        )),
    }
}

/// Decompose a locator such as `3:16-20`, `3-4`, `3:16-4:2` or `3`.
///
/// An end chapter equal to the start chapter is dropped, so `3:16-3:20`
/// and `3:16-20` produce the same range.
pub fn split_range(input: &str, locator: &str) -> Result<ChapterVerseRange> {
    let parts: Vec<&str> = locator.split('-').map(str::trim).collect();
    if parts.len() > 2 || parts.iter().any(|p| p.is_empty()) {
        return Err(Error::invalid_reference(input, "malformed chapter and verse range"));
    }

    let mut range = if parts[0].contains(':') {
        let (chapter_start, verse_start) = parse_chapter_verse(input, parts[0])?;
        let mut range = ChapterVerseRange::verse(chapter_start, verse_start);
        if let Some(end) = parts.get(1) {
            if end.contains(':') {
                let (chapter_end, verse_end) = parse_chapter_verse(input, end)?;
                range.chapter_end = Some(chapter_end);
                range.verse_end = Some(verse_end);
            } else {
                range.verse_end = Some(parse_number(input, end)?);
            }
        }
        range
    } else {
        let mut range = ChapterVerseRange::chapter(parse_number(input, parts[0])?);
        if let Some(end) = parts.get(1) {
            range.chapter_end = Some(parse_number(input, end)?);
        }
        range
    };

    if range.chapter_end == Some(range.chapter_start) {
        range.chapter_end = None;
    }

    range
        .validate()
        .map_err(|reason| Error::invalid_reference(input, reason))?;
    Ok(range)
}

/// Parse one citation into a [`ReferenceGroup`].
///
/// Citations without a bible list use `default_bibles`; if that is empty
/// too the citation fails with [`Error::FallbackBibleNotFound`].
pub fn parse_reference_group(input: &str, default_bibles: &[String]) -> Result<ReferenceGroup> {
    let (translations, book_chapter_verse) = extract_translations(input)?;
    let (book_name, locator) = split_book_and_locator(input, &book_chapter_verse)?;
    let range = split_range(input, locator)?;

    let bibles = translations.unwrap_or_else(|| default_bibles.to_vec());
    if bibles.is_empty() {
        return Err(Error::FallbackBibleNotFound {
            input: input.to_string(),
        });
    }

    Ok(ReferenceGroup {
        book_name: book_name.to_string(),
        range,
        bibles,
    })
}
