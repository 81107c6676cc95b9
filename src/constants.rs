//! Library constants.
//!
//! Centralizes defaults and upstream API values.

/// API.Bible constants.
pub mod api {
    /// Base URL of the API.Bible service.
    pub const BASE_URL: &str = "https://api.scripture.api.bible";

    /// Per-request timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

    /// Header carrying the API key.
    pub const API_KEY_HEADER: &str = "api-key";

    /// Retries after the first attempt when the service answers 503.
    pub const DEFAULT_MAX_RETRIES: u32 = 3;

    /// Backoff before the first retry; doubles on each further retry.
    pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 300;

    /// Pause before every upstream call.
    pub const DEFAULT_DELAY_BETWEEN_CALLS_MS: u64 = 1000;
}

/// Cache layout and defaults.
pub mod cache {
    /// Directory name under the platform cache directory.
    pub const PROJECT_NAME: &str = "ephrem";

    /// Bible abbreviation map file.
    pub const BIBLES_FILE: &str = "bibles.json";

    /// Book name reference file.
    pub const BOOK_NAMES_FILE: &str = "book-names.json";

    /// Cached passages file.
    pub const PASSAGES_FILE: &str = "passages.json";

    /// Entries older than this many days are evicted on load.
    pub const DEFAULT_MAX_CACHE_AGE_DAYS: f64 = 30.0;
}

/// Reference resolution defaults.
pub mod reference {
    /// Separator between citation groups.
    pub const DEFAULT_DELIMITER: &str = ";";

    /// Delimiters that would split a single citation.
    pub const RESERVED_DELIMITERS: &[&str] = &[",", ".", " "];

    /// Languages whose bibles feed book-name resolution.
    pub const DEFAULT_LANGUAGES: &[&str] = &["eng"];

    /// Bibles used when a citation names none.
    pub const DEFAULT_BIBLES: &[&str] = &["KJV"];

    /// Whether ambiguous names fall back to the majority vote.
    pub const DEFAULT_USE_MAJORITY_FALLBACK: bool = true;
}
