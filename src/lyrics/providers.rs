//! In-memory page source for tests and offline runs

use super::fetcher::{PageDocument, PageSource, SongQuery};
use super::site_provider::lyrics_page_url;
use anyhow::Result;
use async_trait::async_trait;
use lyrics_web_rs::client::resolve_fragment;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

type UrlBuilder = fn(&str, &SongQuery) -> String;

/// A page source serving canned pages and search results.
///
/// Unknown URLs fail like a 404. Every call is recorded so tests can
/// assert which transitions touched the network.
pub struct MockPageSource {
    name: String,
    base_url: String,
    url_builder: UrlBuilder,
    pages: HashMap<String, String>,
    search_results: HashMap<String, Vec<String>>,
    failing_search: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl MockPageSource {
    /// A source building lyrics-site style canonical URLs under `base_url`
    pub fn new(name: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            url_builder: lyrics_page_url,
            pages: HashMap::new(),
            search_results: HashMap::new(),
            failing_search: false,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_url_builder(mut self, builder: UrlBuilder) -> Self {
        self.url_builder = builder;
        self
    }

    /// Serve `html` for `url` (absolute, or a fragment under the base URL)
    pub fn add_page(mut self, url: &str, html: impl Into<String>) -> Self {
        let url = resolve_fragment(&self.base_url, url);
        self.pages.insert(url, html.into());
        self
    }

    /// Return `fragments` when searching for `query`
    pub fn add_search(mut self, query: &SongQuery, fragments: Vec<&str>) -> Self {
        self.search_results.insert(
            query.search_text(),
            fragments.into_iter().map(str::to_string).collect(),
        );
        self
    }

    /// Make every search fail like a transport error
    pub fn failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    /// Sleep before answering any call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls received so far, as `"fetch <url>"` / `"search <text>"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    async fn wait(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl PageSource for MockPageSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn canonical_url(&self, query: &SongQuery) -> String {
        (self.url_builder)(&self.base_url, query)
    }

    fn resolve_fragment(&self, fragment: &str) -> String {
        resolve_fragment(&self.base_url, fragment)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageDocument> {
        let url = resolve_fragment(&self.base_url, url);
        self.record(format!("fetch {}", url));
        self.wait().await;

        let html = self
            .pages
            .get(&url)
            .ok_or_else(|| anyhow::anyhow!("GET {} returned HTTP 404", url))?;
        Ok(PageDocument::new(url, html.clone()))
    }

    async fn search(&self, query: &SongQuery) -> Result<Vec<String>> {
        let text = query.search_text();
        self.record(format!("search {}", text));
        self.wait().await;

        if self.failing_search {
            anyhow::bail!("search for '{}' failed: connection reset", text);
        }
        Ok(self.search_results.get(&text).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_pages_and_search() {
        let query = SongQuery::new("Queen", "Bohemian Rhapsody");
        let source = MockPageSource::new("mock", "https://lyrics.test")
            .add_page("/queen-bohemian-rhapsody-lyrics", "<p>hi</p>")
            .add_search(&query, vec!["/queen-bohemian-rhapsody-lyrics"]);

        assert_eq!(
            source.canonical_url(&query),
            "https://lyrics.test/queen-bohemian-rhapsody-lyrics"
        );

        let page = source
            .fetch_page("https://lyrics.test/queen-bohemian-rhapsody-lyrics")
            .await
            .unwrap();
        assert_eq!(page.html(), "<p>hi</p>");
        assert!(source.fetch_page("/missing").await.is_err());

        let hits = source.search(&query).await.unwrap();
        assert_eq!(hits, vec!["/queen-bohemian-rhapsody-lyrics"]);
        assert!(source
            .search(&SongQuery::new("Nobody", "Nothing"))
            .await
            .unwrap()
            .is_empty());

        assert_eq!(source.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_failing_search() {
        let source = MockPageSource::new("mock", "https://lyrics.test").failing_search();
        let err = source.search(&SongQuery::new("a", "b")).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
