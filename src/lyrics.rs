pub mod fetcher;
pub mod providers;
pub mod site_provider;

use crate::text::{purify, slugify};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

/// Cache key for a song: `{artist}-{title}`, each segment purified.
///
/// `purify` only keeps ASCII, so segments with any other character use the
/// lower-cased slug instead and distinct non-Latin names stay distinct.
pub fn song_key(artist: &str, title: &str) -> String {
    format!("{}-{}", key_segment(artist), key_segment(title))
}

fn key_segment(text: &str) -> String {
    if text.is_ascii() {
        purify(text)
    } else {
        let words = text.split_whitespace().collect::<Vec<_>>().join(" ");
        slugify(&words, &[]).to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedLyrics {
    pub song_key: String,
    pub content: String,
    /// Page the lyrics were scraped from
    pub source_url: Option<String>,
    pub fetched_at: String,
}

/// Lyrics already fetched, persisted in sqlite so reruns skip the network.
#[derive(Debug, Clone)]
pub struct LyricsCache {
    pool: SqlitePool,
}

impl LyricsCache {
    /// Open (or create) the cache database at `db_path`
    pub async fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let connection_string = format!("sqlite:{}", db_path.display());
        let options = SqliteConnectOptions::from_str(&connection_string)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("Failed to connect to lyrics cache")?;

        let cache = Self { pool };
        cache.initialize().await?;

        tracing::debug!("Lyrics cache opened at {}", db_path.display());
        Ok(cache)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS lyrics (
                song_key TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source_url TEXT,
                fetched_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create lyrics table")?;

        Ok(())
    }

    /// Save or replace the lyrics stored under `song_key`
    pub async fn put(
        &self,
        song_key: &str,
        content: &str,
        source_url: Option<&str>,
    ) -> Result<CachedLyrics> {
        let now = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO lyrics (song_key, content, source_url, fetched_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(song_key) DO UPDATE SET
                content = excluded.content,
                source_url = excluded.source_url,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(song_key)
        .bind(content)
        .bind(source_url)
        .bind(&now)
        .execute(&self.pool)
        .await
        .context("Failed to save lyrics")?;

        Ok(CachedLyrics {
            song_key: song_key.to_string(),
            content: content.to_string(),
            source_url: source_url.map(str::to_string),
            fetched_at: now,
        })
    }

    /// Cached lyrics for `song_key`. Entries with empty content count as missing.
    pub async fn get(&self, song_key: &str) -> Result<Option<CachedLyrics>> {
        let row = sqlx::query_as::<_, (String, String, Option<String>, String)>(
            r#"
            SELECT song_key, content, source_url, fetched_at
            FROM lyrics
            WHERE song_key = ?
            "#,
        )
        .bind(song_key)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch cached lyrics")?;

        Ok(row
            .filter(|(_, content, _, _)| !content.is_empty())
            .map(|(song_key, content, source_url, fetched_at)| CachedLyrics {
                song_key,
                content,
                source_url,
                fetched_at,
            }))
    }

    pub async fn remove(&self, song_key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lyrics WHERE song_key = ?")
            .bind(song_key)
            .execute(&self.pool)
            .await
            .context("Failed to delete cached lyrics")?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn len(&self) -> Result<usize> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lyrics")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count cached lyrics")?;

        Ok(count as usize)
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_cache() -> (tempfile::TempDir, LyricsCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = LyricsCache::open(dir.path().join("cache").join("lyrics.db"))
            .await
            .unwrap();
        (dir, cache)
    }

    #[test]
    fn test_song_key() {
        assert_eq!(song_key("Simon & Garfunkel", "The Boxer"), "simon-and-garfunkel-the-boxer");
        assert_eq!(song_key("Ed Sheeran", "Perfect (Remastered)"), "ed-sheeran-perfect");
    }

    #[test]
    fn test_song_key_non_latin() {
        assert_eq!(song_key("米津玄師", "レモン"), "米津玄師-レモン");
        assert_eq!(song_key("宇多田ヒカル", "初恋"), "宇多田ヒカル-初恋");
        assert_eq!(song_key("Beyoncé", "Halo"), "beyoncé-halo");
        assert_eq!(song_key("IU", "밤편지 (Through the Night)"), "iu-밤편지-(through-the-night)");
        assert_ne!(song_key("BLACKPINK", "뚜두뚜두"), song_key("BLACKPINK", "마지막처럼"));
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (_dir, cache) = temp_cache().await;
        assert!(cache.is_empty().await.unwrap());

        cache
            .put("queen-bohemian-rhapsody", "is this the real life", Some("https://genius.com/x"))
            .await
            .unwrap();

        let cached = cache.get("queen-bohemian-rhapsody").await.unwrap().unwrap();
        assert_eq!(cached.content, "is this the real life");
        assert_eq!(cached.source_url.as_deref(), Some("https://genius.com/x"));
        assert_eq!(cache.len().await.unwrap(), 1);
        assert!(cache.get("unknown").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (_dir, cache) = temp_cache().await;
        cache.put("k", "first", None).await.unwrap();
        cache.put("k", "second", Some("u")).await.unwrap();

        let cached = cache.get("k").await.unwrap().unwrap();
        assert_eq!(cached.content, "second");
        assert_eq!(cache.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_empty_content_is_a_miss() {
        let (_dir, cache) = temp_cache().await;
        cache.put("k", "", None).await.unwrap();
        assert!(cache.get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let (_dir, cache) = temp_cache().await;
        cache.put("k", "text", None).await.unwrap();
        assert!(cache.remove("k").await.unwrap());
        assert!(!cache.remove("k").await.unwrap());
        assert_eq!(cache.len().await.unwrap(), 0);
    }
}
