//! A configured client with its caches loaded.
//!
//! [`Session`] ties the API client, both caches, and the configuration
//! together and writes the caches back after each top-level operation.

use std::path::Path;

use chrono::Utc;

use crate::api_bible::{ApiBibleClient, BibleApi};
use crate::cache::bibles::BiblesCache;
use crate::cache::passages::PassagesCache;
use crate::cache::refresh;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::passage::{self, FetchOptions, PassageGroup};
use crate::reference::{self, Reference, ResolveOptions, ResolvedGroup};

/// Configuration, API client, and loaded caches.
pub struct Session<A: BibleApi = ApiBibleClient> {
    config: Config,
    api: A,
    bibles: BiblesCache,
    passages: PassagesCache,
}

impl Session<ApiBibleClient> {
    /// Session against API.Bible, failing early when no key is configured.
    pub async fn open(config: Config) -> Result<Self> {
        if !config.has_api_key() {
            return Err(Error::ApiKeyNotFound);
        }
        let api = ApiBibleClient::new(&config);
        Ok(Self::load(config, api).await)
    }
}

impl<A: BibleApi> Session<A> {
    /// Load both caches from the configured directory.
    pub async fn load(config: Config, api: A) -> Self {
        let now = Utc::now();
        let dir = config.cache_dir.as_path();
        let bibles = BiblesCache::load(dir, config.max_cache_age_days, now).await;
        let passages = PassagesCache::load(dir, config.max_cache_age_days, now).await;
        Self {
            config,
            api,
            bibles,
            passages,
        }
    }

    /// The active configuration
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The API client
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// The bible cache
    pub const fn bibles(&self) -> &BiblesCache {
        &self.bibles
    }

    /// The passage cache
    pub const fn passages(&self) -> &PassagesCache {
        &self.passages
    }

    /// Cache directory
    pub fn cache_dir(&self) -> &Path {
        &self.config.cache_dir
    }

    /// Resolution options derived from the configuration
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions::from_config(&self.config)
    }

    /// Write both caches if they changed. Both writes are attempted.
    pub async fn save(&mut self) -> Result<bool> {
        let dir = self.config.cache_dir.clone();
        let bibles = self.bibles.save(&dir).await;
        let passages = self.passages.save(&dir).await;
        Ok(bibles? | passages?)
    }

    /// Force a refresh of bibles and books for `languages`, then save.
    ///
    /// An empty list refreshes the configured languages.
    pub async fn setup(&mut self, languages: &[String]) -> Result<()> {
        let options = self.resolve_options();
        let languages = if languages.is_empty() {
            options.languages.as_slice()
        } else {
            languages
        };
        let result = refresh::update_cache(
            &mut self.bibles,
            &self.api,
            true,
            languages,
            &options.bibles_to_exclude,
            Utc::now(),
        )
        .await;
        self.finish(result).await
    }

    /// Resolve every citation in `input`.
    pub async fn resolve(&mut self, input: &str, options: &ResolveOptions) -> Result<Vec<ResolvedGroup>> {
        let result = reference::parse_references(&mut self.bibles, &self.api, input, options, Utc::now()).await;
        self.finish(result).await
    }

    /// Resolve one citation in its first bible.
    pub async fn resolve_one(&mut self, input: &str, options: &ResolveOptions) -> Result<Reference> {
        let result = reference::parse_reference(&mut self.bibles, &self.api, input, options, Utc::now()).await;
        self.finish(result).await
    }

    /// Passages for every citation in `input`.
    pub async fn get_passages(
        &mut self,
        input: &str,
        fetch: &FetchOptions,
        options: &ResolveOptions,
    ) -> Result<Vec<PassageGroup>> {
        let result = passage::get_passages(
            &mut self.bibles,
            &mut self.passages,
            &self.api,
            input,
            fetch,
            options,
            Utc::now(),
        )
        .await;
        self.finish(result).await
    }

    /// Save whatever the operation merged, even when it failed.
    ///
    /// The operation's own error wins over a save error.
    async fn finish<T: Send>(&mut self, result: Result<T>) -> Result<T> {
        let saved = self.save().await;
        let value = result?;
        saved?;
        Ok(value)
    }
}
