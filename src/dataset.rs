//! Batch enrichment: track metadata in, one record per track out.

use crate::enrich::{EnrichOutcome, EnrichState, Enrichment, LyricsExtractor, Via};
use crate::features::FEATURE_KEYS;
use crate::genre::common_genre;
use crate::lyrics::fetcher::{PageSource, ResolverConfig, SongQuery};
use crate::lyrics::{song_key, LyricsCache};
use crate::reference::ReferenceData;
use crate::sentiment::SentimentScorer;
use crate::song_facts::{SongFacts, SongFactsExtractor};
use anyhow::{Context, Result};
use futures::stream::{self, Stream, StreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// Catalog metadata for one track. Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub name: String,
    /// Primary artist name
    pub artists: String,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub release_month: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    /// Track length in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Columns [`SongRecord`] writes next to the track's own fields
const RECORD_KEYS: &[&str] = &[
    "common_genre",
    "lyrics_url",
    "lyrics_source",
    "song_facts",
    "failure",
    "enriched_at",
];

impl TrackMetadata {
    pub fn query(&self) -> SongQuery {
        SongQuery::new(&self.artists, &self.name)
    }

    /// Drop columns left by an earlier enrichment run, so feeding an output
    /// file back in yields each column once.
    pub fn strip_enrichment(&mut self) {
        for key in RECORD_KEYS.iter().chain(FEATURE_KEYS.iter()) {
            self.extra.remove(*key);
        }
    }
}

/// One output row. Feature keys are always present, `null` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongRecord {
    #[serde(flatten)]
    pub track: TrackMetadata,
    pub common_genre: Option<String>,
    pub lyrics_url: Option<String>,
    pub lyrics_source: Option<Via>,
    #[serde(flatten)]
    pub features: Map<String, Value>,
    pub song_facts: Option<SongFacts>,
    /// Why the lyrics fields are absent
    pub failure: Option<String>,
    pub enriched_at: String,
}

impl SongRecord {
    pub fn has_lyrics_features(&self) -> bool {
        self.failure.is_none()
    }

    pub fn to_row(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(row) => Ok(row),
            other => anyhow::bail!("record serialized to non-object: {}", other),
        }
    }
}

fn absent_features() -> Map<String, Value> {
    FEATURE_KEYS
        .iter()
        .map(|key| (key.to_string(), Value::Null))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub complete: usize,
    pub partial: usize,
    pub from_cache: usize,
    pub via_fallback: usize,
}

impl BatchSummary {
    fn record(&mut self, record: &SongRecord) {
        self.total += 1;
        if record.has_lyrics_features() {
            self.complete += 1;
        } else {
            self.partial += 1;
        }
        match record.lyrics_source {
            Some(Via::Cache) => self.from_cache += 1,
            Some(Via::Fallback) => self.via_fallback += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub resolver: ResolverConfig,
    /// Songs in flight at once; output order is input order regardless
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverConfig::default(),
            concurrency: 1,
        }
    }
}

pub struct Pipeline {
    lyrics_source: Arc<dyn PageSource>,
    facts_source: Option<Arc<dyn PageSource>>,
    cache: Option<LyricsCache>,
    reference: Arc<ReferenceData>,
    scorer: Arc<dyn SentimentScorer>,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(
        lyrics_source: Arc<dyn PageSource>,
        reference: Arc<ReferenceData>,
        scorer: Arc<dyn SentimentScorer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            lyrics_source,
            facts_source: None,
            cache: None,
            reference,
            scorer,
            config,
        }
    }

    pub fn with_cache(mut self, cache: LyricsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_song_facts(mut self, source: Arc<dyn PageSource>) -> Self {
        self.facts_source = Some(source);
        self
    }

    async fn cached_lyrics(&self, key: &str) -> Option<(String, Option<String>)> {
        if !self.config.resolver.enable_cache {
            return None;
        }
        let cache = self.cache.as_ref()?;
        match cache.get(key).await {
            Ok(hit) => hit.map(|cached| (cached.content, cached.source_url)),
            Err(e) => {
                tracing::warn!("Lyrics cache lookup for {} failed: {:#}", key, e);
                None
            }
        }
    }

    async fn store_lyrics(&self, key: &str, lyrics: &str, url: Option<&str>) {
        if !self.config.resolver.enable_cache {
            return;
        }
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.put(key, lyrics, url).await {
                tracing::warn!("Failed to cache lyrics for {}: {:#}", key, e);
            }
        }
    }

    async fn song_facts(&self, query: &SongQuery) -> Option<SongFacts> {
        let source = self.facts_source.as_deref()?;
        let extractor = SongFactsExtractor;
        let outcome = Enrichment::new(source, &extractor, &self.config.resolver, query.clone())
            .run()
            .await;
        match outcome {
            EnrichOutcome::Complete { value, .. } => Some(value),
            EnrichOutcome::Partial { .. } => None,
        }
    }

    /// Enrich one track. Never fails: problems end up in `failure`.
    pub async fn enrich_track(&self, mut track: TrackMetadata, common_genre: Option<String>) -> SongRecord {
        track.strip_enrichment();
        let query = track.query();
        let key = song_key(&track.artists, &track.name);

        let initial = match self.cached_lyrics(&key).await {
            Some((text, url)) => {
                tracing::debug!("Lyrics cache hit for {}", key);
                EnrichState::from_cache(text, url)
            }
            None => EnrichState::BuildUrl,
        };

        let extractor = LyricsExtractor::new(&self.reference, self.scorer.as_ref());
        let outcome = Enrichment::new(
            self.lyrics_source.as_ref(),
            &extractor,
            &self.config.resolver,
            query.clone(),
        )
        .run_from(initial)
        .await;

        let song_facts = self.song_facts(&query).await;
        let enriched_at = chrono::Utc::now().to_rfc3339();

        match outcome {
            EnrichOutcome::Complete { url, via, value } => {
                if via != Via::Cache {
                    self.store_lyrics(&key, &value.lyrics, url.as_deref()).await;
                }
                SongRecord {
                    track,
                    common_genre,
                    lyrics_url: url,
                    lyrics_source: Some(via),
                    features: value.features.to_map(),
                    song_facts,
                    failure: None,
                    enriched_at,
                }
            }
            EnrichOutcome::Partial { url, diagnostic } => SongRecord {
                track,
                common_genre,
                lyrics_url: url,
                lyrics_source: None,
                features: absent_features(),
                song_facts,
                failure: Some(diagnostic.to_string()),
                enriched_at,
            },
        }
    }

    /// Records in input order. Genre labels are drawn up front, in input
    /// order, so a seeded `rng` gives reproducible labels at any concurrency.
    pub fn records<'a, R: Rng + ?Sized>(
        &'a self,
        tracks: Vec<TrackMetadata>,
        rng: &mut R,
    ) -> impl Stream<Item = SongRecord> + 'a {
        let labeled: Vec<(TrackMetadata, Option<String>)> = tracks
            .into_iter()
            .map(|track| {
                let genre = common_genre(&track.genres, rng).map(str::to_string);
                (track, genre)
            })
            .collect();

        stream::iter(labeled)
            .map(move |(track, genre)| self.enrich_track(track, genre))
            .buffered(self.config.concurrency.max(1))
    }

    /// Enrich every track and write one JSON line per record as it completes.
    pub async fn run<R: Rng + ?Sized, W: Write>(
        &self,
        tracks: Vec<TrackMetadata>,
        rng: &mut R,
        out: &mut W,
    ) -> Result<BatchSummary> {
        let total = tracks.len();
        let mut summary = BatchSummary::default();
        let mut records = Box::pin(self.records(tracks, rng));

        while let Some(record) = records.next().await {
            summary.record(&record);
            write_record(out, &record)?;
            tracing::info!(
                "[{}/{}] {} - {}: {}",
                summary.total,
                total,
                record.track.artists,
                record.track.name,
                record.failure.as_deref().unwrap_or("ok")
            );
        }
        out.flush().context("Failed to flush output")?;

        tracing::info!(
            "Enriched {} tracks: {} complete, {} partial ({} from cache, {} via fallback)",
            summary.total,
            summary.complete,
            summary.partial,
            summary.from_cache,
            summary.via_fallback
        );
        Ok(summary)
    }
}

/// Parse JSON-lines track metadata. Blank lines are skipped.
pub fn read_tracks<R: BufRead>(input: R) -> Result<Vec<TrackMetadata>> {
    let mut tracks = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read input line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let track: TrackMetadata = serde_json::from_str(&line)
            .with_context(|| format!("Invalid track metadata on line {}", idx + 1))?;
        tracks.push(track);
    }
    Ok(tracks)
}

pub fn write_record<W: Write>(out: &mut W, record: &SongRecord) -> Result<()> {
    serde_json::to_writer(&mut *out, record).context("Failed to serialize record")?;
    out.write_all(b"\n").context("Failed to write record")?;
    Ok(())
}
