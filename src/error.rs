//! Crate error types.
//!
//! Every failure carries the offending input or identifiers so callers can
//! build an actionable message without inspecting strings.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Crate result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Identifies the upstream request that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchContext {
    /// Listing bibles, optionally filtered by language.
    Bibles {
        /// ISO 639-3 language filter, if one was sent.
        language: Option<String>,
    },
    /// Listing the books of one bible.
    Books {
        /// Upstream bible id.
        bible_id: String,
    },
    /// Fetching one passage.
    Passage {
        /// Canonical passage id (e.g. `JHN.3.16-JHN.3.20`).
        passage_id: String,
        /// Upstream bible id.
        bible_id: String,
    },
}

impl fmt::Display for FetchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bibles { language: Some(language) } => write!(f, "bibles (language {language})"),
            Self::Bibles { language: None } => write!(f, "bibles"),
            Self::Books { bible_id } => write!(f, "books of bible {bible_id}"),
            Self::Passage { passage_id, bible_id } => {
                write!(f, "passage {passage_id} of bible {bible_id}")
            }
        }
    }
}

/// Error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// Citation text does not follow the citation grammar
    #[error("Invalid reference {input:?}: {reason}")]
    InvalidReference {
        /// The offending citation text.
        input: String,
        /// What made it invalid.
        reason: String,
    },

    /// Citation delimiter collides with characters used inside a citation
    #[error("Invalid delimiter {delimiter:?}: ',', '.' and ' ' are reserved inside citations")]
    InvalidDelimiter {
        /// The rejected delimiter.
        delimiter: String,
    },

    /// No bible was named in the citation and no default bibles are configured
    #[error("Input {input:?} does not name a bible and no fallback bible was provided")]
    FallbackBibleNotFound {
        /// The citation text.
        input: String,
    },

    /// Bible abbreviation is not present in the cache
    #[error("Unknown bible abbreviation {abbreviation:?}")]
    UnknownBibleAbbreviation {
        /// The abbreviation that was looked up.
        abbreviation: String,
    },

    /// Book name could not be resolved to a canonical book id
    #[error("Book {book_name:?} not found{}", .bible.as_ref().map(|b| format!(" for bible {b}")).unwrap_or_default())]
    BookNotFound {
        /// The book name as written by the caller.
        book_name: String,
        /// The bible the name was resolved against, if any.
        bible: Option<String>,
    },

    /// Book resolved, but the target bible does not contain it
    #[error("Book {book_id} is not available in bible {bible} (requested by {input:?})")]
    BookNotInBible {
        /// The citation text.
        input: String,
        /// The resolved canonical book id.
        book_id: String,
        /// The bible abbreviation.
        bible: String,
        /// Book ids the bible does contain.
        available_book_ids: Vec<String>,
    },

    /// Bible is absent from the upstream data (usually an API key scope issue)
    #[error("Bible {abbreviation:?} is not available on API.Bible or is inaccessible with the current API key")]
    BibleNotAvailable {
        /// The abbreviation that was requested.
        abbreviation: String,
    },

    /// Language id is not a lower-case ISO 639-3 code
    #[error("Language id {language:?} does not match ISO 639-3 format (lower case)")]
    InvalidLanguageId {
        /// The rejected language id.
        language: String,
    },

    /// No API key configured
    #[error("API.Bible key not found. Set API_BIBLE_API_KEY")]
    ApiKeyNotFound,

    /// Network error (connection, timeout, DNS): no response received
    #[error("No response received while fetching {context}: {message}")]
    Network {
        /// The request that failed.
        context: FetchContext,
        /// Transport error description.
        message: String,
    },

    /// Upstream API answered with an error status
    #[error("API.Bible error while fetching {context}: {status} {status_text}{}", .hint.as_ref().map(|h| format!(". {h}")).unwrap_or_default())]
    Api {
        /// The request that failed.
        context: FetchContext,
        /// HTTP status code.
        status: u16,
        /// HTTP reason phrase.
        status_text: String,
        /// Actionable suggestion for resolving the error.
        hint: Option<&'static str>,
    },

    /// Upstream kept answering 503 until retries ran out
    #[error("Service temporarily unavailable while fetching {context} after {attempts} attempts")]
    ServiceUnavailable {
        /// The request that failed.
        context: FetchContext,
        /// How many attempts were made.
        attempts: u32,
    },

    /// IO error with path context
    #[error("IO error at {path:?}: {source}")]
    Io {
        /// The underlying IO error.
        source: std::io::Error,
        /// File path where the error occurred, if known.
        path: Option<PathBuf>,
    },

    /// JSON (de)serialization error with path context
    #[error("JSON error in {path:?}: {source}")]
    Json {
        /// The underlying serde error.
        source: serde_json::Error,
        /// File the JSON came from or was written to, if any.
        path: Option<PathBuf>,
    },

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Generic message error (escape hatch)
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an IO error with path context
    pub fn io(source: std::io::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Io { source, path: path.into() }
    }

    /// Create a JSON error with path context
    pub fn json(source: serde_json::Error, path: impl Into<Option<PathBuf>>) -> Self {
        Self::Json { source, path: path.into() }
    }

    /// Create an invalid reference error
    pub fn invalid_reference(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create an API error from an HTTP status, attaching a hint where one is known
    pub fn api_status(context: FetchContext, status: u16, status_text: impl Into<String>) -> Self {
        let hint = match status {
            400 => Some("Not authorized to retrieve any Bibles or invalid language provided"),
            401 => Some("Missing or invalid API key. Check API_BIBLE_API_KEY"),
            403 => Some("Your API key may lack access to this Bible"),
            404 => Some("The requested resource was not found"),
            429 => Some("Rate limited - wait a moment and try again"),
            500..=599 => Some("API.Bible server error - try again later"),
            _ => None,
        };
        Self::Api {
            context,
            status,
            status_text: status_text.into(),
            hint,
        }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Whether retrying the same request could succeed
    ///
    /// For callers deciding whether to rerun a failed top-level operation.
    /// Requests are already retried on 503 inside the client, so a
    /// `ServiceUnavailable` here means those retries ran out.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable { .. } | Self::Api { status: 503, .. }
        )
    }

    /// HTTP status of an upstream failure, if there was one
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::ServiceUnavailable { .. } => Some(503),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io { source: e, path: None }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Self::Msg(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Self::Msg(s.to_string())
    }
}
