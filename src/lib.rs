//! Lyric Dataset - enrich music catalog tracks with lyrics-derived features
//!
//! Each track's lyrics page is resolved through a canonical URL, falling back
//! to a site search and fuzzy matching, then analyzed into a fixed feature
//! record (section counts, vocabulary ratios, sentiment).

pub mod dataset;
pub mod enrich;
pub mod features;
pub mod genre;
pub mod lyrics;
pub mod matcher;
pub mod reference;
pub mod sentiment;
pub mod song_facts;
pub mod text;
