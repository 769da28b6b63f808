use serde::{Deserialize, Serialize};

/// CSS selector for result links on a search results page.
pub const RESULT_LINK_SELECTOR: &str = "a.items-start";

/// Body returned when a search is created with `POST /api/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCreated {
    pub data: SearchRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRef {
    #[serde(default)]
    pub id: Option<String>,
    pub href: String,
}

/// Request body for `POST /api/search`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}
