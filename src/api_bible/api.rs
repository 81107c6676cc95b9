use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::api_bible::retry::{retry_on_503, RetryPolicy};
use crate::api_bible::types::{
    BibleResponse, BookResponse, DataEnvelope, PassageAndFums, PassageOptions,
};
use crate::api_bible::BibleApi;
use crate::config::Config;
use crate::constants::api;
use crate::error::{Error, FetchContext, Result};

/// Client for the API.Bible REST service
///
/// Every request waits the configured inter-call delay first and is retried
/// with exponential backoff while the service answers 503.
#[derive(Clone)]
pub struct ApiBibleClient {
    api_key: String,
    base_url: String,
    retry: RetryPolicy,
    client: Client,
}

impl ApiBibleClient {
    /// Create a new API.Bible client from config
    pub fn new(config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy::from_config(config),
            client: Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(concat!("ephrem/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Check if an API key is configured
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Make one authenticated GET request and decode the JSON body
    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: &FetchContext,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .header(api::API_KEY_HEADER, &self.api_key)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| Error::Network {
                context: context.clone(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::api_status(
                context.clone(),
                status.as_u16(),
                status.canonical_reason().unwrap_or_default(),
            ));
        }

        let body = resp.text().await.map_err(|e| Error::Network {
            context: context.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&body).map_err(|e| Error::json(e, None))
    }

    /// Paced, retried GET
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        context: FetchContext,
    ) -> Result<T> {
        if !self.is_configured() {
            return Err(Error::ApiKeyNotFound);
        }

        if !self.retry.delay_between_calls.is_zero() {
            tokio::time::sleep(self.retry.delay_between_calls).await;
        }

        tracing::debug!("Fetching {context} from {path}");
        retry_on_503(&self.retry, &context, || self.get_once(path, query, &context)).await
    }
}

#[async_trait]
impl BibleApi for ApiBibleClient {
    async fn fetch_bibles(&self, language: Option<&str>) -> Result<Vec<BibleResponse>> {
        let mut query = vec![("include-full-details", "false".to_string())];
        if let Some(language) = language {
            query.push(("language", language.to_string()));
        }
        let context = FetchContext::Bibles {
            language: language.map(str::to_string),
        };

        let envelope: DataEnvelope<Vec<BibleResponse>> =
            self.get("/v1/bibles", &query, context).await?;
        Ok(envelope.data)
    }

    async fn fetch_books(&self, bible_id: &str) -> Result<Vec<BookResponse>> {
        let path = format!("/v1/bibles/{bible_id}/books");
        let query = [("include-chapters", "false".to_string())];
        let context = FetchContext::Books {
            bible_id: bible_id.to_string(),
        };

        let envelope: DataEnvelope<Vec<BookResponse>> = self.get(&path, &query, context).await?;
        Ok(envelope.data)
    }

    async fn fetch_passage(
        &self,
        passage_id: &str,
        bible_id: &str,
        options: &PassageOptions,
    ) -> Result<PassageAndFums> {
        let path = format!("/v1/bibles/{bible_id}/passages/{passage_id}");
        let context = FetchContext::Passage {
            passage_id: passage_id.to_string(),
            bible_id: bible_id.to_string(),
        };

        self.get(&path, &options.query_params(), context).await
    }
}
