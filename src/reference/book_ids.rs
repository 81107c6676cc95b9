//! Canonical USFM book identifiers.

use std::collections::HashMap;

use lazy_static::lazy_static;

/// Every canonical book id with its English name, in canonical order.
pub const BOOK_IDS: &[(&str, &str)] = &[
    ("GEN", "Genesis"),
    ("EXO", "Exodus"),
    ("LEV", "Leviticus"),
    ("NUM", "Numbers"),
    ("DEU", "Deuteronomy"),
    ("JOS", "Joshua"),
    ("JDG", "Judges"),
    ("RUT", "Ruth"),
    ("1SA", "1 Samuel"),
    ("2SA", "2 Samuel"),
    ("1KI", "1 Kings"),
    ("2KI", "2 Kings"),
    ("1CH", "1 Chronicles"),
    ("2CH", "2 Chronicles"),
    ("EZR", "Ezra"),
    ("NEH", "Nehemiah"),
    ("EST", "Esther (Hebrew)"),
    ("JOB", "Job"),
    ("PSA", "Psalms"),
    ("PRO", "Proverbs"),
    ("ECC", "Ecclesiastes"),
    ("SNG", "Song of Songs"),
    ("ISA", "Isaiah"),
    ("JER", "Jeremiah"),
    ("LAM", "Lamentations"),
    ("EZK", "Ezekiel"),
    ("DAN", "Daniel (Hebrew)"),
    ("HOS", "Hosea"),
    ("JOL", "Joel"),
    ("AMO", "Amos"),
    ("OBA", "Obadiah"),
    ("JON", "Jonah"),
    ("MIC", "Micah"),
    ("NAM", "Nahum"),
    ("HAB", "Habakkuk"),
    ("ZEP", "Zephaniah"),
    ("HAG", "Haggai"),
    ("ZEC", "Zechariah"),
    ("MAL", "Malachi"),
    ("MAT", "Matthew"),
    ("MRK", "Mark"),
    ("LUK", "Luke"),
    ("JHN", "John"),
    ("ACT", "Acts"),
    ("ROM", "Romans"),
    ("1CO", "1 Corinthians"),
    ("2CO", "2 Corinthians"),
    ("GAL", "Galatians"),
    ("EPH", "Ephesians"),
    ("PHP", "Philippians"),
    ("COL", "Colossians"),
    ("1TH", "1 Thessalonians"),
    ("2TH", "2 Thessalonians"),
    ("1TI", "1 Timothy"),
    ("2TI", "2 Timothy"),
    ("TIT", "Titus"),
    ("PHM", "Philemon"),
    ("HEB", "Hebrews"),
    ("JAS", "James"),
    ("1PE", "1 Peter"),
    ("2PE", "2 Peter"),
    ("1JN", "1 John"),
    ("2JN", "2 John"),
    ("3JN", "3 John"),
    ("JUD", "Jude"),
    ("REV", "Revelation"),
    ("TOB", "Tobit"),
    ("JDT", "Judith"),
    ("ESG", "Esther (Greek)"),
    ("WIS", "Wisdom of Solomon"),
    ("SIR", "Sirach"),
    ("BAR", "Baruch"),
    ("LJE", "Letter of Jeremiah"),
    ("S3Y", "Song of the Three Young Men"),
    ("SUS", "Susanna"),
    ("BEL", "Bel and the Dragon"),
    ("1MA", "1 Maccabees"),
    ("2MA", "2 Maccabees"),
    ("3MA", "3 Maccabees"),
    ("4MA", "4 Maccabees"),
    ("1ES", "1 Esdras (Greek)"),
    ("2ES", "2 Esdras (Latin)"),
    ("MAN", "Prayer of Manasseh"),
    ("PS2", "Psalm 151"),
    ("ODA", "Odae"),
    ("PSS", "Psalms of Solomon"),
    ("EZA", "Ezra Apocalypse"),
    ("5EZ", "5 Ezra"),
    ("6EZ", "6 Ezra"),
    ("DAG", "Daniel (Greek)"),
    ("PS3", "Psalms 152-155"),
    ("2BA", "2 Baruch (Apocalypse)"),
    ("LBA", "Letter of Baruch"),
    ("JUB", "Jubilees"),
    ("ENO", "Enoch"),
    ("1MQ", "1 Meqabyan"),
    ("2MQ", "2 Meqabyan"),
    ("3MQ", "3 Meqabyan"),
    ("REP", "Reproof"),
    ("4BA", "4 Baruch"),
    ("LAO", "Letter to the Laodiceans"),
];

lazy_static! {
    static ref BOOK_NAMES_BY_ID: HashMap<&'static str, &'static str> =
        BOOK_IDS.iter().copied().collect();
}

/// Whether `id` is one of the canonical book ids.
pub fn is_book_id(id: &str) -> bool {
    BOOK_NAMES_BY_ID.contains_key(id)
}

/// English name of a canonical book id.
pub fn book_name(id: &str) -> Option<&'static str> {
    BOOK_NAMES_BY_ID.get(id).copied()
}
