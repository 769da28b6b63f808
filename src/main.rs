use anyhow::{Context, Result};
use clap::Parser;
use lyric_dataset::dataset::{read_tracks, Pipeline, PipelineConfig};
use lyric_dataset::lyrics::fetcher::ResolverConfig;
use lyric_dataset::lyrics::site_provider::SitePageSource;
use lyric_dataset::lyrics::LyricsCache;
use lyric_dataset::reference::ReferenceData;
use lyric_dataset::sentiment::LexiconScorer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyric-dataset")]
#[command(about = "Enrich track metadata with lyrics features", long_about = None)]
struct Cli {
    /// Track metadata as JSON lines ('-' for stdin)
    #[arg(short, long, env = "LYRIC_DATASET_INPUT")]
    input: PathBuf,

    /// Where to write enriched records as JSON lines (stdout if omitted)
    #[arg(short, long, env = "LYRIC_DATASET_OUTPUT")]
    output: Option<PathBuf>,

    /// Lyrics cache database
    #[arg(long, env = "LYRIC_DATASET_CACHE_DB", default_value = ".lyric-dataset/lyrics.db")]
    cache_db: PathBuf,

    /// Always fetch lyrics, ignoring and not updating the cache
    #[arg(long)]
    no_cache: bool,

    /// Stop word list replacing the built-in one (one word per line)
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Slang word list replacing the built-in one (one word per line)
    #[arg(long)]
    slang: Option<PathBuf>,

    /// Sentiment lexicon replacing the built-in one ('word<TAB>valence' lines)
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Deadline for each page fetch or search, in seconds
    #[arg(long, env = "LYRIC_DATASET_FETCH_TIMEOUT", default_value_t = 15)]
    fetch_timeout_secs: u64,

    /// Songs enriched concurrently
    #[arg(short, long, default_value_t = 1)]
    concurrency: usize,

    /// Also resolve tempo, key and duration
    #[arg(long)]
    song_facts: bool,

    /// Seed for the genre label draw
    #[arg(long)]
    seed: Option<u64>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let reference = ReferenceData::load(
        cli.stopwords.as_deref(),
        cli.slang.as_deref(),
        cli.lexicon.as_deref(),
    )
    .context("Failed to load reference data")?;
    let reference = Arc::new(reference);
    let scorer = Arc::new(LexiconScorer::new(reference.lexicon()));

    let tracks = if cli.input.as_os_str() == "-" {
        read_tracks(io::stdin().lock())?
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("Failed to open {}", cli.input.display()))?;
        read_tracks(BufReader::new(file))?
    };
    tracing::info!("Loaded {} tracks from {}", tracks.len(), cli.input.display());

    let timeout = Duration::from_secs(cli.fetch_timeout_secs);
    let config = PipelineConfig {
        resolver: ResolverConfig {
            timeout,
            enable_cache: !cli.no_cache,
        },
        concurrency: cli.concurrency,
    };

    let lyrics_source = SitePageSource::genius(timeout)?;
    let mut pipeline = Pipeline::new(Arc::new(lyrics_source), reference, scorer, config);

    if !cli.no_cache {
        let cache = LyricsCache::open(&cli.cache_db)
            .await
            .with_context(|| format!("Failed to open lyrics cache {}", cli.cache_db.display()))?;
        tracing::info!(
            "Lyrics cache: {} ({} entries)",
            cli.cache_db.display(),
            cache.len().await?
        );
        pipeline = pipeline.with_cache(cache);
    }

    if cli.song_facts {
        pipeline = pipeline.with_song_facts(Arc::new(SitePageSource::songbpm(timeout)?));
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let summary = pipeline.run(tracks, &mut rng, &mut out).await?;

    if summary.partial > 0 {
        tracing::warn!("{} of {} records are partial", summary.partial, summary.total);
    }
    if let Some(path) = &cli.output {
        tracing::info!("Records written to {}", path.display());
    }

    Ok(())
}
