use crate::client::{build_client, get_page, resolve_fragment};
use crate::error::{Result, WebError};
use crate::genius::models::SearchResponse;
use crate::models::{PageDocument, Site};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

pub struct GeniusApi {
    client: Client,
    base_url: String,
}

impl GeniusApi {
    pub fn new(timeout: Duration) -> Result<Self> {
        info!("Initializing Genius client");
        Ok(Self {
            client: build_client(timeout)?,
            base_url: Site::Genius.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a lyrics page. Relative paths are resolved against the base URL.
    #[instrument(skip(self), fields(site = "genius"))]
    pub async fn fetch_page(&self, url: &str) -> Result<PageDocument> {
        let url = resolve_fragment(&self.base_url, url);
        get_page(&self.client, &url).await
    }

    /// Search songs and return the page path of every hit, in result order.
    #[instrument(skip(self), fields(site = "genius"))]
    pub async fn search_song_paths(&self, query: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/api/search/song?per_page=20&q={}",
            self.base_url,
            urlencoding::encode(query)
        );
        debug!("Searching '{}'", query);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse search response: {}", e);
            WebError::JsonParse(e)
        })?;

        let paths = parsed.song_paths();
        info!("Search '{}' returned {} song paths", query, paths.len());
        Ok(paths)
    }
}
