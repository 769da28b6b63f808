pub mod client;
pub mod error;
pub mod genius;
pub mod models;
pub mod songbpm;

use async_trait::async_trait;
pub use error::{Result, WebError};
pub use genius::GeniusApi;
pub use models::*;
pub use songbpm::SongBpmApi;

/// Unified API over the sites the dataset pulls pages from
#[async_trait]
pub trait SiteApi: Send + Sync {
    /// Which site this client talks to
    fn site(&self) -> Site;

    /// Base URL that relative fragments are resolved against
    fn base_url(&self) -> &str;

    /// Fetch a page by absolute URL or site-relative fragment
    async fn fetch_page(&self, url: &str) -> Result<PageDocument>;

    /// Free-text search returning candidate page fragments in result order
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl SiteApi for GeniusApi {
    fn site(&self) -> Site {
        Site::Genius
    }

    fn base_url(&self) -> &str {
        GeniusApi::base_url(self)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageDocument> {
        GeniusApi::fetch_page(self, url).await
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        self.search_song_paths(query).await
    }
}

#[async_trait]
impl SiteApi for SongBpmApi {
    fn site(&self) -> Site {
        Site::SongBpm
    }

    fn base_url(&self) -> &str {
        SongBpmApi::base_url(self)
    }

    async fn fetch_page(&self, url: &str) -> Result<PageDocument> {
        SongBpmApi::fetch_page(self, url).await
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        self.search_song_paths(query).await
    }
}
