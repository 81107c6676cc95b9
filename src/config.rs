//! Library configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::PathBuf;

use crate::api_bible::types::{ContentType, PassageOptions};
use crate::constants::{api, cache, reference};
use crate::error::{Error, Result};

/// Configuration for API access, caching, and reference resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// API.Bible key sent in the `api-key` header
    pub api_key: String,
    /// API.Bible base URL
    pub base_url: String,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Retries after a 503
    pub max_retries: u32,
    /// Backoff before the first retry, doubled per retry
    pub initial_backoff_ms: u64,
    /// Pause before every upstream call
    pub delay_between_calls_ms: u64,
    /// Languages (ISO 639-3) whose bibles feed book-name resolution
    pub languages: Vec<String>,
    /// Bible abbreviations never added to the cache
    pub bibles_to_exclude: Vec<String>,
    /// Bibles used when a citation names none
    pub default_bibles: Vec<String>,
    /// Directory holding the JSON cache files
    pub cache_dir: PathBuf,
    /// Evict cache entries older than this; `None` disables eviction
    pub max_cache_age_days: Option<f64>,
    /// Resolve ambiguous names by majority vote when the bible has no match
    pub use_majority_fallback: bool,
    /// Default passage formatting flags
    pub passage_options: PassageOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: api::BASE_URL.to_string(),
            timeout_secs: api::DEFAULT_TIMEOUT_SECS,
            max_retries: api::DEFAULT_MAX_RETRIES,
            initial_backoff_ms: api::DEFAULT_INITIAL_BACKOFF_MS,
            delay_between_calls_ms: api::DEFAULT_DELAY_BETWEEN_CALLS_MS,
            languages: to_strings(reference::DEFAULT_LANGUAGES),
            bibles_to_exclude: Vec::new(),
            default_bibles: to_strings(reference::DEFAULT_BIBLES),
            cache_dir: default_cache_dir(),
            max_cache_age_days: Some(cache::DEFAULT_MAX_CACHE_AGE_DAYS),
            use_majority_fallback: reference::DEFAULT_USE_MAJORITY_FALLBACK,
            passage_options: PassageOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();

        let config = Self::from_lookup(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Reject values no request could succeed with
    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(Error::config(
                format!("API base URL {:?} is not an http(s) URL", self.base_url),
                "Set API_BIBLE_BASE_URL to e.g. https://api.scripture.api.bible",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::config(
                "API timeout is zero",
                "Set EPHREM_API_TIMEOUT_SECS to a positive number of seconds",
            ));
        }
        Ok(())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// Unset, empty, or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get("API_BIBLE_API_KEY") {
            config.api_key = key.trim().to_string();
        }
        if let Some(url) = get("API_BIBLE_BASE_URL") {
            config.base_url = url.trim().to_string();
        }
        if let Some(secs) = get("EPHREM_API_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            config.timeout_secs = secs;
        }
        if let Some(retries) = get("EPHREM_API_MAX_RETRIES").and_then(|v| v.trim().parse().ok()) {
            config.max_retries = retries;
        }
        if let Some(ms) = get("EPHREM_API_INITIAL_BACKOFF_MS").and_then(|v| v.trim().parse().ok()) {
            config.initial_backoff_ms = ms;
        }
        if let Some(ms) = get("EPHREM_API_DELAY_BETWEEN_CALLS_MS").and_then(|v| v.trim().parse().ok()) {
            config.delay_between_calls_ms = ms;
        }
        if let Some(languages) = get("EPHREM_LANGUAGES") {
            config.languages = split_list(&languages);
        }
        if let Some(excluded) = get("EPHREM_BIBLES_TO_EXCLUDE") {
            config.bibles_to_exclude = split_list(&excluded);
        }
        if let Some(bibles) = get("EPHREM_DEFAULT_BIBLES") {
            config.default_bibles = split_list(&bibles);
        }
        if let Some(path) = get("EPHREM_CACHE_PATH") {
            config.cache_dir = PathBuf::from(shellexpand::tilde(path.trim()).to_string());
        }

        // Zero or negative ages disable eviction
        if let Some(days) = get("EPHREM_MAX_CACHE_AGE_DAYS").and_then(|v| v.trim().parse::<f64>().ok()) {
            config.max_cache_age_days = (days > 0.0).then_some(days);
        }

        if let Some(flag) = get("EPHREM_USE_MAJORITY_FALLBACK").and_then(|v| parse_bool(&v)) {
            config.use_majority_fallback = flag;
        }

        let options = &mut config.passage_options;
        if let Some(content_type) = get("EPHREM_CONTENT_TYPE").and_then(|v| ContentType::parse(&v)) {
            options.content_type = content_type;
        }
        for (name, flag) in [
            ("EPHREM_INCLUDE_NOTES", &mut options.include_notes),
            ("EPHREM_INCLUDE_TITLES", &mut options.include_titles),
            ("EPHREM_INCLUDE_CHAPTER_NUMBERS", &mut options.include_chapter_numbers),
            ("EPHREM_INCLUDE_VERSE_NUMBERS", &mut options.include_verse_numbers),
            ("EPHREM_INCLUDE_VERSE_SPANS", &mut options.include_verse_spans),
        ] {
            if let Some(value) = get(name).and_then(|v| parse_bool(&v)) {
                *flag = value;
            }
        }

        config
    }

    /// Check if an API.Bible key is configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Platform cache directory for ephrem, or a local fallback
fn default_cache_dir() -> PathBuf {
    dirs::cache_dir().map_or_else(
        || PathBuf::from(".ephrem-cache"),
        |dir| dir.join(cache::PROJECT_NAME),
    )
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Split a comma separated list, trimming and dropping empty items
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
