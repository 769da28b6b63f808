//! Page-fetching collaborators
//!
//! The enrichment state machine only talks to sites through [`PageSource`]:
//! build a canonical URL, fetch a page, search for candidate pages. Concrete
//! sites live in `site_provider`, test doubles in `providers`.

use anyhow::Result;
use async_trait::async_trait;
pub use lyrics_web_rs::PageDocument;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The song being enriched
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SongQuery {
    pub artist: String,
    pub title: String,
}

impl SongQuery {
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
        }
    }

    /// Free text handed to site searches: `"{artist} {title}"`
    pub fn search_text(&self) -> String {
        format!("{} {}", self.artist, self.title)
    }
}

/// Settings shared by every resolver run
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Deadline for each single fetch or search call
    pub timeout: Duration,
    /// Whether cached lyrics short-circuit the network
    pub enable_cache: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            enable_cache: true,
        }
    }
}

/// A site the resolver can pull pages from.
///
/// Implementations must be safe to call concurrently; the batch pipeline
/// shares one source across all in-flight songs.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Short name used in logs (e.g. "genius")
    fn name(&self) -> &str;

    /// The deterministic page URL for a song
    fn canonical_url(&self, query: &SongQuery) -> String;

    /// Turn a candidate fragment from [`PageSource::search`] into an absolute URL
    fn resolve_fragment(&self, fragment: &str) -> String;

    /// Fetch one page. Any transport error or non-success status is an `Err`.
    async fn fetch_page(&self, url: &str) -> Result<PageDocument>;

    /// Candidate page fragments for a song, in result order
    async fn search(&self, query: &SongQuery) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_text() {
        let query = SongQuery::new("Queen", "Bohemian Rhapsody");
        assert_eq!(query.search_text(), "Queen Bohemian Rhapsody");
    }

    #[test]
    fn test_default_config() {
        let config = ResolverConfig::default();
        assert_eq!(config.timeout.as_secs(), 15);
        assert!(config.enable_cache);
    }
}
