use clap::Parser;
use lyrics_web_rs::{GeniusApi, SiteApi, SongBpmApi};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Site Probe
///
/// Search a lyrics or song-facts site and dump the page behind one of the hits.
#[derive(Parser, Debug)]
#[command(name = "site_probe")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Site to use: 'genius' or 'songbpm'
    #[arg(short, long, value_name = "SITE", default_value = "genius")]
    site: String,

    /// Search query (artist and song title)
    #[arg(short, long, value_name = "QUERY")]
    query: Option<String>,

    /// Request timeout in seconds
    #[arg(short, long, env = "SITE_TIMEOUT_SECS", default_value_t = 15)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls the level, e.g. RUST_LOG=debug ./site_probe
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let timeout = Duration::from_secs(args.timeout);

    let api: Box<dyn SiteApi> = match args.site.to_lowercase().as_str() {
        "genius" | "g" => Box::new(GeniusApi::new(timeout)?),
        "songbpm" | "bpm" => Box::new(SongBpmApi::new(timeout)?),
        other => {
            eprintln!("Invalid site: '{}'. Use 'genius' or 'songbpm'.", other);
            return Ok(());
        }
    };

    println!("=== Site Probe: {} ===\n", api.site().as_str());

    let query = match args.query {
        Some(q) => q,
        None => {
            print!("Enter artist and song title to search: ");
            io::stdout().flush()?;
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };

    if query.is_empty() {
        eprintln!("Search query cannot be empty. Exiting.");
        return Ok(());
    }

    println!("Searching for '{}'...\n", query);
    let hits = api.search(&query).await?;

    if hits.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("{:<4} {}", "No.", "Page");
    println!("{}", "-".repeat(80));
    for (idx, hit) in hits.iter().enumerate() {
        println!("{:<4} {}", idx + 1, hit);
    }

    print!("\nEnter result number to fetch (or 0 to exit): ");
    io::stdout().flush()?;
    let mut selection = String::new();
    io::stdin().read_line(&mut selection)?;

    let selection: usize = match selection.trim().parse() {
        Ok(n) if n > 0 && n <= hits.len() => n,
        Ok(0) => {
            println!("Exiting.");
            return Ok(());
        }
        _ => {
            eprintln!("Invalid selection. Exiting.");
            return Ok(());
        }
    };

    let page = api.fetch_page(&hits[selection - 1]).await?;
    println!("\nFetched {}", page.url());

    let output_dir = Path::new("probe_pages");
    fs::create_dir_all(output_dir)?;

    let content = match page.lyrics_text() {
        Some(lyrics) => {
            println!("\n{}\n", lyrics);
            lyrics
        }
        None => {
            for label in ["Tempo", "Key", "Duration"] {
                if let Some(value) = page.definition(label) {
                    println!("{:<10} {}", label, value);
                }
            }
            page.html().to_string()
        }
    };

    let filepath = output_dir.join(format!("{}.txt", sanitize_filename(&query)));
    fs::write(&filepath, content)?;
    println!("✓ Saved to: {}", filepath.display());
    Ok(())
}

/// Sanitize filename by removing or replacing invalid characters
fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
