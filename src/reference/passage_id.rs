//! Canonical passage ids such as `JHN.3.16-JHN.3.20`.

use crate::error::{Error, Result};
use crate::reference::{is_book_id, ChapterVerseRange};

fn boundary(book: &str, chapter: u32, verse: Option<u32>) -> String {
    match verse {
        Some(verse) => format!("{book}.{chapter}.{verse}"),
        None => format!("{book}.{chapter}"),
    }
}

/// Format a book id and range as an API.Bible passage id.
///
/// An end chapter equal to the start chapter is ignored, as is an end verse
/// equal to the start verse.
pub fn get_passage_id(book: &str, range: &ChapterVerseRange) -> String {
    let start = boundary(book, range.chapter_start, range.verse_start);
    if range.is_single_verse() {
        return start;
    }
    let chapter_end = range.chapter_end.filter(|_| range.is_multi_chapter());

    let end = match (chapter_end, range.verse_end) {
        (Some(chapter), Some(verse)) => Some(boundary(book, chapter, Some(verse))),
        (Some(chapter), None) => Some(boundary(book, chapter, None)),
        (None, Some(verse)) => Some(boundary(book, range.chapter_start, Some(verse))),
        (None, None) => None,
    };

    match end {
        Some(end) => format!("{start}-{end}"),
        None => start,
    }
}

fn parse_boundary(passage_id: &str, part: &str) -> Result<(String, u32, Option<u32>)> {
    let invalid = || Error::invalid_reference(passage_id, "not a passage id");
    let number = |value: &str| value.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(invalid);

    match part.split('.').collect::<Vec<_>>().as_slice() {
        [book, chapter] if is_book_id(book) => Ok(((*book).to_string(), number(*chapter)?, None)),
        [book, chapter, verse] if is_book_id(book) => {
            Ok(((*book).to_string(), number(*chapter)?, Some(number(*verse)?)))
        }
        _ => Err(invalid()),
    }
}

/// Parse a passage id back into its book id and range.
pub fn parse_passage_id(passage_id: &str) -> Result<(String, ChapterVerseRange)> {
    let invalid = |reason: &str| Error::invalid_reference(passage_id, reason);

    let (start, end) = match passage_id.split_once('-') {
        Some((start, end)) => (start, Some(end)),
        None => (passage_id, None),
    };

    let (book, chapter_start, verse_start) = parse_boundary(passage_id, start)?;
    let mut range = ChapterVerseRange {
        chapter_start,
        chapter_end: None,
        verse_start,
        verse_end: None,
    };

    if let Some(end) = end {
        let (end_book, chapter_end, verse_end) = parse_boundary(passage_id, end)?;
        if end_book != book {
            return Err(invalid("a passage cannot span books"));
        }
        if verse_start.is_some() != verse_end.is_some() {
            return Err(invalid("both ends must name a verse, or neither"));
        }
        if chapter_end != chapter_start {
            range.chapter_end = Some(chapter_end);
        }
        range.verse_end = verse_end;
    }

    range.validate().map_err(invalid)?;
    Ok((book, range))
}
