//! API.Bible data types.
//!
//! Only the fields the library reads are typed; everything else is kept in
//! `extra` so passages are relayed exactly as the API returned them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{"data": ...}` wrapper used by every list endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Reading direction of a language's script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptDirection {
    /// Left to right.
    #[serde(rename = "LTR")]
    Ltr,
    /// Right to left.
    #[serde(rename = "RTL")]
    Rtl,
}

/// Language block of a bible listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageResponse {
    /// ISO 639-3 code.
    pub id: String,
    /// English language name.
    #[serde(default)]
    pub name: String,
    /// Language name in the language itself.
    #[serde(default)]
    pub name_local: String,
    /// Script name.
    #[serde(default)]
    pub script: String,
    /// Script direction.
    #[serde(default)]
    pub script_direction: Option<ScriptDirection>,
}

/// One bible from `GET /v1/bibles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BibleResponse {
    /// Opaque upstream bible id.
    pub id: String,
    /// Primary abbreviation (e.g. `engKJV`).
    pub abbreviation: String,
    /// Local abbreviation (e.g. `KJV`).
    #[serde(default)]
    pub abbreviation_local: String,
    /// Bible name.
    #[serde(default)]
    pub name: String,
    /// Bible name in its own language.
    #[serde(default)]
    pub name_local: String,
    /// Language of the translation.
    pub language: LanguageResponse,
    /// Fields not used by the library.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One book from `GET /v1/bibles/{id}/books`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    /// USFM book id (e.g. `JHN`).
    pub id: String,
    /// Upstream bible id.
    #[serde(default)]
    pub bible_id: String,
    /// Short name used by this bible (e.g. `Jn`).
    #[serde(default)]
    pub abbreviation: String,
    /// Display name used by this bible (e.g. `John`).
    pub name: String,
    /// Long display name.
    #[serde(default)]
    pub name_long: String,
}

/// Format of passage content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// HTML markup.
    Html,
    /// Structured JSON.
    Json,
    /// Plain text.
    #[default]
    Text,
}

impl ContentType {
    /// Query parameter value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Text => "text",
        }
    }

    /// Parse a configured content type, case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Formatting flags sent with every passage request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_excessive_bools)]
pub struct PassageOptions {
    /// Content format.
    pub content_type: ContentType,
    /// Include footnotes.
    pub include_notes: bool,
    /// Include section titles.
    pub include_titles: bool,
    /// Include chapter numbers.
    pub include_chapter_numbers: bool,
    /// Include verse numbers.
    pub include_verse_numbers: bool,
    /// Include verse span markup.
    pub include_verse_spans: bool,
}

impl PassageOptions {
    /// Query parameters for the passage endpoint.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("content-type", self.content_type.as_str().to_string()),
            ("include-notes", self.include_notes.to_string()),
            ("include-titles", self.include_titles.to_string()),
            ("include-chapter-numbers", self.include_chapter_numbers.to_string()),
            ("include-verse-numbers", self.include_verse_numbers.to_string()),
            ("include-verse-spans", self.include_verse_spans.to_string()),
            ("use-org-id", "false".to_string()),
        ]
    }
}

/// Passage body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageResponse {
    /// Passage id as echoed by the API.
    pub id: String,
    /// Human readable reference (e.g. `John 3:16-20`).
    #[serde(default)]
    pub reference: String,
    /// Text, HTML, or JSON content depending on [`ContentType`].
    #[serde(default)]
    pub content: Value,
    /// Copyright notice.
    #[serde(default)]
    pub copyright: String,
    /// Fields not used by the library.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fair-use tracking metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FumsResponse {
    /// FUMS script snippet.
    #[serde(default)]
    pub fums: String,
    /// Fields not used by the library.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full response of `GET /v1/bibles/{id}/passages/{passage}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageAndFums {
    /// The passage.
    pub data: PassageResponse,
    /// FUMS metadata.
    #[serde(default)]
    pub meta: FumsResponse,
}
