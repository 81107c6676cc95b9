//! API.Bible integration.
//!
//! Provides the upstream client used to list bibles, list the books of a
//! bible, and fetch passages, plus the retry policy shared by all three.

/// HTTP client for API.Bible requests
pub mod api;
/// Retry-on-503 with exponential backoff
pub mod retry;
/// Data types representing API.Bible resources
pub mod types;

use async_trait::async_trait;

use crate::error::Result;

pub use api::ApiBibleClient;
pub use retry::RetryPolicy;
pub use types::{
    BibleResponse, BookResponse, ContentType, FumsResponse, PassageAndFums, PassageOptions,
    PassageResponse,
};

/// Read-only view of the upstream Bible content service.
///
/// [`ApiBibleClient`] is the production implementation; tests substitute an
/// in-memory one.
#[async_trait]
pub trait BibleApi: Send + Sync {
    /// List bibles, optionally filtered by ISO 639-3 language id.
    async fn fetch_bibles(&self, language: Option<&str>) -> Result<Vec<BibleResponse>>;

    /// List the books of one bible.
    async fn fetch_books(&self, bible_id: &str) -> Result<Vec<BookResponse>>;

    /// Fetch one passage with the given formatting flags.
    async fn fetch_passage(
        &self,
        passage_id: &str,
        bible_id: &str,
        options: &PassageOptions,
    ) -> Result<PassageAndFums>;
}
