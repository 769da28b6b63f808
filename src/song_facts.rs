//! Tempo, key and duration scraped from a song-facts page.

use crate::enrich::{EnrichFailure, Obtained, PageExtractor};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFacts {
    pub tempo: Option<String>,
    pub key: Option<String>,
    pub duration: Option<String>,
}

impl SongFacts {
    pub fn is_empty(&self) -> bool {
        self.tempo.is_none() && self.key.is_none() && self.duration.is_none()
    }
}

/// Reads the "Tempo", "Key" and "Duration" definitions. Labels missing from
/// the page stay `None`; that is not a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct SongFactsExtractor;

impl PageExtractor for SongFactsExtractor {
    type Output = SongFacts;

    fn extract(&self, obtained: &Obtained) -> Result<SongFacts, EnrichFailure> {
        let page = match obtained {
            Obtained::Page(page) => page,
            // facts are never cached
            Obtained::Cached(_) => return Ok(SongFacts::default()),
        };

        let facts = SongFacts {
            tempo: page.definition("Tempo"),
            key: page.definition("Key"),
            duration: page.definition("Duration"),
        };
        if facts.is_empty() {
            tracing::debug!("No song facts on {}", page.url());
        }
        Ok(facts)
    }
}
