use super::fetcher::{PageDocument, PageSource, SongQuery};
use crate::text::{slugify, LYRICS_SITE_REPLACEMENTS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use lyrics_web_rs::client::resolve_fragment;
use lyrics_web_rs::{GeniusApi, SiteApi, SongBpmApi};
use std::time::Duration;

/// `{base}/{artist}-{title}-lyrics`, punctuation dropped, lower-cased
pub fn lyrics_page_url(base: &str, query: &SongQuery) -> String {
    let artist = slugify(&query.artist, LYRICS_SITE_REPLACEMENTS);
    let title = slugify(&query.title, LYRICS_SITE_REPLACEMENTS);
    format!("{}/{}-{}-lyrics", base.trim_end_matches('/'), artist, title).to_lowercase()
}

/// `{base}/@{artist}/{title}` with the default slug table, lower-cased
pub fn song_facts_page_url(base: &str, query: &SongQuery) -> String {
    let artist = slugify(&query.artist, &[]);
    let title = slugify(&query.title, &[]);
    format!("{}/@{}/{}", base.trim_end_matches('/'), artist, title).to_lowercase()
}

/// Adapts a `lyrics-web-rs` site client to [`PageSource`]
pub struct SitePageSource<A: SiteApi> {
    api: A,
    url_builder: fn(&str, &SongQuery) -> String,
}

impl SitePageSource<GeniusApi> {
    /// Lyrics pages
    pub fn genius(timeout: Duration) -> Result<Self> {
        let api = GeniusApi::new(timeout).context("Failed to create Genius client")?;
        Ok(Self::new(api, lyrics_page_url))
    }
}

impl SitePageSource<SongBpmApi> {
    /// Tempo, key and duration pages
    pub fn songbpm(timeout: Duration) -> Result<Self> {
        let api = SongBpmApi::new(timeout).context("Failed to create songbpm client")?;
        Ok(Self::new(api, song_facts_page_url))
    }
}

impl<A: SiteApi> SitePageSource<A> {
    pub fn new(api: A, url_builder: fn(&str, &SongQuery) -> String) -> Self {
        Self { api, url_builder }
    }
}

#[async_trait]
impl<A: SiteApi> PageSource for SitePageSource<A> {
    fn name(&self) -> &str {
        self.api.site().as_str()
    }

    fn canonical_url(&self, query: &SongQuery) -> String {
        (self.url_builder)(self.api.base_url(), query)
    }

    fn resolve_fragment(&self, fragment: &str) -> String {
        resolve_fragment(self.api.base_url(), fragment)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageDocument> {
        match self.api.fetch_page(url).await {
            Ok(page) => Ok(page),
            Err(e) if e.is_missing_page() => {
                tracing::debug!("{}: no page at {}", self.name(), url);
                Err(e.into())
            }
            Err(e) => {
                tracing::warn!("{}: fetching {} failed: {}", self.name(), url, e);
                Err(anyhow::Error::new(e).context(format!("{} fetch failed", self.name())))
            }
        }
    }

    async fn search(&self, query: &SongQuery) -> Result<Vec<String>> {
        let text = query.search_text();
        tracing::debug!("{} search query: {}", self.name(), text);

        let fragments = self
            .api
            .search(&text)
            .await
            .with_context(|| format!("{} search failed", self.name()))?;

        tracing::debug!("{} found {} candidates", self.name(), fragments.len());
        Ok(fragments)
    }
}
