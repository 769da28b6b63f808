use crate::client::{build_client, get_page, resolve_fragment};
use crate::error::{Result, WebError};
use crate::models::{PageDocument, Site};
use crate::songbpm::models::{SearchCreated, SearchRequest, RESULT_LINK_SELECTOR};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

pub struct SongBpmApi {
    client: Client,
    base_url: String,
}

impl SongBpmApi {
    pub fn new(timeout: Duration) -> Result<Self> {
        info!("Initializing songbpm client");
        Ok(Self {
            client: build_client(timeout)?,
            base_url: Site::SongBpm.base_url().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self), fields(site = "songbpm"))]
    pub async fn fetch_page(&self, url: &str) -> Result<PageDocument> {
        let url = resolve_fragment(&self.base_url, url);
        get_page(&self.client, &url).await
    }

    /// Search works in two steps: posting the query creates a search and
    /// returns its href, then the results page lists candidate song links.
    #[instrument(skip(self), fields(site = "songbpm"))]
    pub async fn search_song_paths(&self, query: &str) -> Result<Vec<String>> {
        let url = format!("{}/api/search", self.base_url);
        debug!("Creating search for '{}'", query);

        let response = self
            .client
            .post(&url)
            .json(&SearchRequest {
                query: query.to_string(),
            })
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        let created: SearchCreated = serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse search creation response: {}", e);
            WebError::JsonParse(e)
        })?;

        if created.data.href.is_empty() {
            return Err(WebError::NotFound(format!("search results for '{}'", query)));
        }

        let results = self.fetch_page(&created.data.href).await?;
        let paths = results.links(RESULT_LINK_SELECTOR)?;
        info!("Search '{}' returned {} result links", query, paths.len());
        Ok(paths)
    }
}
