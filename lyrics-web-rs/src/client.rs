use crate::error::{Result, WebError};
use crate::models::PageDocument;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Build the shared HTTP client used by every site API.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .cookie_store(true)
        .build()?)
}

/// GET `url` and wrap the body as a [`PageDocument`].
///
/// Any non-2xx status is an error; callers decide whether that means
/// "try something else".
pub(crate) async fn get_page(client: &Client, url: &str) -> Result<PageDocument> {
    debug!("GET {}", url);
    let response = client.get(url).send().await?;
    let status = response.status();

    if !status.is_success() {
        warn!("GET {} returned {}", url, status);
        return Err(WebError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let final_url = response.url().to_string();
    let body = response.text().await?;
    debug!("Fetched {} bytes from {}", body.len(), final_url);
    Ok(PageDocument::new(final_url, body))
}

/// Join a site-relative fragment onto `base`. Absolute URLs pass through.
pub fn resolve_fragment(base: &str, fragment: &str) -> String {
    if fragment.starts_with("http://") || fragment.starts_with("https://") {
        fragment.to_string()
    } else if fragment.starts_with('/') {
        format!("{}{}", base.trim_end_matches('/'), fragment)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fragment() {
        assert_eq!(
            resolve_fragment("https://genius.com", "/Queen-bohemian-rhapsody-lyrics"),
            "https://genius.com/Queen-bohemian-rhapsody-lyrics"
        );
        assert_eq!(
            resolve_fragment("https://songbpm.com/", "@queen/bohemian-rhapsody"),
            "https://songbpm.com/@queen/bohemian-rhapsody"
        );
        assert_eq!(
            resolve_fragment("https://genius.com", "https://genius.com/a-b-lyrics"),
            "https://genius.com/a-b-lyrics"
        );
    }
}
