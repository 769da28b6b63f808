//! Per-song enrichment as an explicit state machine.
//!
//! ```text
//! BuildUrl -> FetchPrimary -> Extract -> Done
//!                  |             ^
//!                  v             |
//!           SearchFallback -> FetchFallback
//!                  |             |
//!                  +--> Failed <-+
//! ```
//!
//! Each call to [`Enrichment::advance`] performs exactly one transition, so
//! every edge can be tested in isolation. Nothing here returns an error to
//! the caller: failures end in a partial outcome carrying a diagnostic.

use crate::features::{FeatureError, LyricsAnalyzer, LyricsFeatures};
use crate::lyrics::fetcher::{PageDocument, PageSource, ResolverConfig, SongQuery};
use crate::matcher::best_match;
use crate::reference::ReferenceData;
use crate::sentiment::SentimentScorer;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a song ended up without its page-derived fields
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnrichFailure {
    #[error("fetch failed for {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    #[error("no fallback page found for {canonical}")]
    NoFallbackFound { canonical: String },

    #[error("search failed for '{query}': {reason}")]
    SearchFailure { query: String, reason: String },

    #[error("feature extraction failed: {0}")]
    Features(#[from] FeatureError),
}

/// Where the extracted content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    Cache,
    Canonical,
    Fallback,
}

/// Content handed to the extract step
#[derive(Debug, Clone, PartialEq)]
pub enum Obtained {
    Page(PageDocument),
    /// Text stored by an earlier run
    Cached(String),
}

/// Pulls the wanted value out of obtained content.
pub trait PageExtractor: Send + Sync {
    type Output: Send;

    fn extract(&self, obtained: &Obtained) -> Result<Self::Output, EnrichFailure>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichOutcome<T> {
    Complete { url: Option<String>, via: Via, value: T },
    /// Page-derived fields absent; `url` is the last URL tried, if any
    Partial { url: Option<String>, diagnostic: EnrichFailure },
}

impl<T> EnrichOutcome<T> {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Complete { url, .. } | Self::Partial { url, .. } => url.as_deref(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Complete { value, .. } => Some(value),
            Self::Partial { .. } => None,
        }
    }

    pub fn diagnostic(&self) -> Option<&EnrichFailure> {
        match self {
            Self::Complete { .. } => None,
            Self::Partial { diagnostic, .. } => Some(diagnostic),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnrichState<T> {
    BuildUrl,
    FetchPrimary { url: String },
    SearchFallback { canonical: String },
    FetchFallback { canonical: String, url: String },
    Extract { url: Option<String>, via: Via, obtained: Obtained },
    Done(EnrichOutcome<T>),
    Failed { url: Option<String>, failure: EnrichFailure },
}

impl<T> EnrichState<T> {
    /// State for content already on hand, skipping every network step
    pub fn from_cache(text: String, url: Option<String>) -> Self {
        Self::Extract {
            url,
            via: Via::Cache,
            obtained: Obtained::Cached(text),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Failed { .. })
    }

    fn name(&self) -> &'static str {
        match self {
            Self::BuildUrl => "build_url",
            Self::FetchPrimary { .. } => "fetch_primary",
            Self::SearchFallback { .. } => "search_fallback",
            Self::FetchFallback { .. } => "fetch_fallback",
            Self::Extract { .. } => "extract",
            Self::Done(_) => "done",
            Self::Failed { .. } => "failed",
        }
    }
}

/// One song's run through the state machine. Owned by a single worker.
pub struct Enrichment<'a, X: PageExtractor> {
    source: &'a dyn PageSource,
    extractor: &'a X,
    config: &'a ResolverConfig,
    query: SongQuery,
}

impl<'a, X: PageExtractor> Enrichment<'a, X> {
    pub fn new(
        source: &'a dyn PageSource,
        extractor: &'a X,
        config: &'a ResolverConfig,
        query: SongQuery,
    ) -> Self {
        Self {
            source,
            extractor,
            config,
            query,
        }
    }

    /// Run `call` under the per-call deadline. Expiry reads as a transport error.
    async fn with_deadline<T, F>(&self, call: F) -> Result<T, String>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.config.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(format!("{:#}", e)),
            Err(_) => Err(format!("timed out after {:?}", self.config.timeout)),
        }
    }

    /// Perform one transition. Terminal states map to themselves.
    pub async fn advance(&self, state: EnrichState<X::Output>) -> EnrichState<X::Output> {
        let from = state.name();
        let next = match state {
            EnrichState::BuildUrl => EnrichState::FetchPrimary {
                url: self.source.canonical_url(&self.query),
            },

            EnrichState::FetchPrimary { url } => {
                match self.with_deadline(self.source.fetch_page(&url)).await {
                    Ok(page) => EnrichState::Extract {
                        url: Some(url),
                        via: Via::Canonical,
                        obtained: Obtained::Page(page),
                    },
                    Err(reason) => {
                        debug!("{}: primary fetch of {} failed: {}", self.source.name(), url, reason);
                        EnrichState::SearchFallback { canonical: url }
                    }
                }
            }

            EnrichState::SearchFallback { canonical } => {
                match self.with_deadline(self.source.search(&self.query)).await {
                    Err(reason) => EnrichState::Failed {
                        url: Some(canonical),
                        failure: EnrichFailure::SearchFailure {
                            query: self.query.search_text(),
                            reason,
                        },
                    },
                    Ok(candidates) => match best_match(&candidates, &canonical) {
                        Some(fragment) => {
                            let url = self.source.resolve_fragment(fragment);
                            warn!("{}: using fallback URL {} (not {})", self.source.name(), url, canonical);
                            EnrichState::FetchFallback { canonical, url }
                        }
                        None => EnrichState::Failed {
                            url: Some(canonical.clone()),
                            failure: EnrichFailure::NoFallbackFound { canonical },
                        },
                    },
                }
            }

            EnrichState::FetchFallback { canonical, url } => {
                match self.with_deadline(self.source.fetch_page(&url)).await {
                    Ok(page) => EnrichState::Extract {
                        url: Some(url),
                        via: Via::Fallback,
                        obtained: Obtained::Page(page),
                    },
                    Err(reason) => {
                        debug!("{}: fallback for {} failed", self.source.name(), canonical);
                        EnrichState::Failed {
                            url: Some(url.clone()),
                            failure: EnrichFailure::FetchFailure { url, reason },
                        }
                    }
                }
            }

            EnrichState::Extract { url, via, obtained } => {
                let outcome = match self.extractor.extract(&obtained) {
                    Ok(value) => EnrichOutcome::Complete { url, via, value },
                    Err(diagnostic) => EnrichOutcome::Partial { url, diagnostic },
                };
                EnrichState::Done(outcome)
            }

            terminal @ (EnrichState::Done(_) | EnrichState::Failed { .. }) => terminal,
        };

        debug!("{} / {}: {} -> {}", self.query.artist, self.query.title, from, next.name());
        next
    }

    /// Drive from `initial` to a terminal state and fold it into an outcome.
    pub async fn run_from(&self, initial: EnrichState<X::Output>) -> EnrichOutcome<X::Output> {
        let mut state = initial;
        loop {
            state = match state {
                EnrichState::Done(outcome) => return outcome,
                EnrichState::Failed { url, failure } => {
                    warn!(
                        "{}: partial record for {} / {}: {}",
                        self.source.name(),
                        self.query.artist,
                        self.query.title,
                        failure
                    );
                    return EnrichOutcome::Partial {
                        url,
                        diagnostic: failure,
                    };
                }
                pending => self.advance(pending).await,
            };
        }
    }

    pub async fn run(&self) -> EnrichOutcome<X::Output> {
        self.run_from(EnrichState::BuildUrl).await
    }
}

/// Lyrics text and the features derived from it
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedLyrics {
    pub lyrics: String,
    pub features: LyricsFeatures,
}

/// Extract step for lyrics pages: scrape the text, then analyze it.
pub struct LyricsExtractor<'a> {
    reference: &'a ReferenceData,
    scorer: &'a dyn SentimentScorer,
}

impl<'a> LyricsExtractor<'a> {
    pub fn new(reference: &'a ReferenceData, scorer: &'a dyn SentimentScorer) -> Self {
        Self { reference, scorer }
    }
}

impl PageExtractor for LyricsExtractor<'_> {
    type Output = EnrichedLyrics;

    fn extract(&self, obtained: &Obtained) -> Result<EnrichedLyrics, EnrichFailure> {
        let lyrics = match obtained {
            Obtained::Page(page) => page.lyrics_text(),
            Obtained::Cached(text) => Some(text.clone()),
        };

        let analyzer = LyricsAnalyzer::new(lyrics.as_deref(), self.reference, self.scorer)?;
        let features = analyzer.extract();
        Ok(EnrichedLyrics {
            lyrics: lyrics.unwrap_or_default(),
            features,
        })
    }
}
