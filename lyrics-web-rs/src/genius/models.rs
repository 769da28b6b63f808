use serde::{Deserialize, Serialize};

/// Body of `GET /api/search/song?q=...`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub response: SearchBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub sections: Vec<SearchSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSection {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub result: HitResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitResult {
    pub path: String,
    #[serde(default)]
    pub full_title: Option<String>,
}

impl SearchResponse {
    /// Song page paths from every song section, in response order.
    pub fn song_paths(self) -> Vec<String> {
        self.response
            .sections
            .into_iter()
            .filter(|section| section.kind == "song")
            .flat_map(|section| section.hits)
            .map(|hit| hit.result.path)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_song_paths() {
        let body = r#"{
            "meta": {"status": 200},
            "response": {"sections": [
                {"type": "song", "hits": [
                    {"index": "song", "result": {"path": "/Queen-bohemian-rhapsody-lyrics", "full_title": "Bohemian Rhapsody by Queen"}},
                    {"index": "song", "result": {"path": "/Queen-bohemian-rhapsody-live-lyrics"}}
                ]},
                {"type": "artist", "hits": [
                    {"index": "artist", "result": {"path": "/artists/Queen"}}
                ]}
            ]}
        }"#;
        let parsed: SearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            parsed.song_paths(),
            vec![
                "/Queen-bohemian-rhapsody-lyrics",
                "/Queen-bohemian-rhapsody-live-lyrics"
            ]
        );
    }

    #[test]
    fn test_empty_sections() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"response": {}}"#).unwrap();
        assert!(parsed.song_paths().is_empty());
    }
}
