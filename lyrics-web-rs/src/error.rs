use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid selector '{0}'")]
    Selector(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl WebError {
    /// True for failures that mean "the page is not there" rather than "the request broke".
    pub fn is_missing_page(&self) -> bool {
        matches!(
            self,
            WebError::NotFound(_) | WebError::Status { status: 404, .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
