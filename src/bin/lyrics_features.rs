use anyhow::{Context, Result};
use clap::Parser;
use lyric_dataset::features::{FeatureError, LyricsAnalyzer};
use lyric_dataset::reference::ReferenceData;
use lyric_dataset::sentiment::LexiconScorer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lyrics-features")]
#[command(about = "Extract the feature record from a local lyrics file", long_about = None)]
struct Cli {
    /// Lyrics text file
    file: PathBuf,

    /// Stop word list replacing the built-in one
    #[arg(long)]
    stopwords: Option<PathBuf>,

    /// Slang word list replacing the built-in one
    #[arg(long)]
    slang: Option<PathBuf>,

    /// Sentiment lexicon replacing the built-in one
    #[arg(long)]
    lexicon: Option<PathBuf>,

    /// Also print the clean text the features were computed from
    #[arg(long)]
    show_clean: bool,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let reference = ReferenceData::load(
        cli.stopwords.as_deref(),
        cli.slang.as_deref(),
        cli.lexicon.as_deref(),
    )
    .context("Failed to load reference data")?;
    let scorer = LexiconScorer::new(reference.lexicon());

    // a missing file is the same condition as empty lyrics
    let raw = match std::fs::read_to_string(&cli.file) {
        Ok(raw) => Some(raw),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", cli.file.display()));
        }
    };

    let analyzer = LyricsAnalyzer::new(raw.as_deref(), &reference, &scorer)
        .map_err(|e: FeatureError| anyhow::anyhow!("{}: {}", cli.file.display(), e))?;

    if cli.show_clean {
        eprintln!("{}", analyzer.clean_text());
    }

    let features = analyzer.extract();
    println!("{}", serde_json::to_string_pretty(&features.to_map())?);

    Ok(())
}
