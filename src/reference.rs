//! Read-only word tables shared by every song.
//!
//! Loaded once at startup (built-in copies or user files) and then only ever
//! borrowed. An empty table is a configuration error reported here, never
//! per song.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};
use thiserror::Error;

const BUILTIN_STOPWORDS: &str = include_str!("../data/stopwords_en.txt");
const BUILTIN_SLANG: &str = include_str!("../data/slang_words.txt");
const BUILTIN_LEXICON: &str = include_str!("../data/sentiment_lexicon.txt");

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("{0} table is empty")]
    EmptyTable(&'static str),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed lexicon line {line}: '{content}'")]
    MalformedLexicon { line: usize, content: String },
}

/// Stop words, slang words and the sentiment lexicon, keyed by lower-cased token.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    stopwords: HashSet<String>,
    slang: HashSet<String>,
    lexicon: Arc<HashMap<String, f64>>,
}

static BUILTIN: OnceLock<Arc<ReferenceData>> = OnceLock::new();

impl ReferenceData {
    /// Build from raw table texts. Every table must end up non-empty.
    pub fn from_sources(stopwords: &str, slang: &str, lexicon: &str) -> Result<Self, ReferenceError> {
        let stopwords = parse_word_list(stopwords);
        if stopwords.is_empty() {
            return Err(ReferenceError::EmptyTable("stop word"));
        }

        let slang = parse_word_list(slang);
        if slang.is_empty() {
            return Err(ReferenceError::EmptyTable("slang"));
        }

        let lexicon = parse_lexicon(lexicon)?;
        if lexicon.is_empty() {
            return Err(ReferenceError::EmptyTable("sentiment lexicon"));
        }

        tracing::debug!(
            "Reference data: {} stop words, {} slang words, {} lexicon entries",
            stopwords.len(),
            slang.len(),
            lexicon.len()
        );

        Ok(Self {
            stopwords,
            slang,
            lexicon: Arc::new(lexicon),
        })
    }

    /// The tables shipped with the crate, parsed once per process.
    pub fn builtin() -> Result<Arc<ReferenceData>, ReferenceError> {
        if let Some(data) = BUILTIN.get() {
            return Ok(Arc::clone(data));
        }
        let data = Arc::new(Self::from_sources(BUILTIN_STOPWORDS, BUILTIN_SLANG, BUILTIN_LEXICON)?);
        Ok(Arc::clone(BUILTIN.get_or_init(|| data)))
    }

    /// Built-in tables with any of them replaced by a user file.
    pub fn load(
        stopwords: Option<&Path>,
        slang: Option<&Path>,
        lexicon: Option<&Path>,
    ) -> Result<Self, ReferenceError> {
        let stopwords = read_or(stopwords, BUILTIN_STOPWORDS)?;
        let slang = read_or(slang, BUILTIN_SLANG)?;
        let lexicon = read_or(lexicon, BUILTIN_LEXICON)?;
        Self::from_sources(&stopwords, &slang, &lexicon)
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Slang lookup ignores apostrophes, so `goin'` matches `goin`.
    pub fn is_slang_listed(&self, token: &str) -> bool {
        if token.contains('\'') {
            self.slang.contains(&token.replace('\'', ""))
        } else {
            self.slang.contains(token)
        }
    }

    pub fn valence(&self, token: &str) -> Option<f64> {
        self.lexicon.get(token).copied()
    }

    /// Shared handle to the lexicon for sentiment scorers.
    pub fn lexicon(&self) -> Arc<HashMap<String, f64>> {
        Arc::clone(&self.lexicon)
    }

    pub fn stop_word_count(&self) -> usize {
        self.stopwords.len()
    }

    pub fn slang_count(&self) -> usize {
        self.slang.len()
    }
}

fn read_or(path: Option<&Path>, builtin: &str) -> Result<String, ReferenceError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|source| ReferenceError::Io {
            path: path.display().to_string(),
            source,
        }),
        None => Ok(builtin.to_string()),
    }
}

fn data_lines(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_word_list(source: &str) -> HashSet<String> {
    data_lines(source).map(|(_, line)| line.to_lowercase()).collect()
}

fn parse_lexicon(source: &str) -> Result<HashMap<String, f64>, ReferenceError> {
    let mut lexicon = HashMap::new();
    for (line_no, line) in data_lines(source) {
        let mut parts = line.split_whitespace();
        let parsed = match (parts.next(), parts.next()) {
            (Some(word), Some(value)) => value.parse::<f64>().ok().map(|v| (word, v)),
            _ => None,
        };
        let Some((word, valence)) = parsed else {
            return Err(ReferenceError::MalformedLexicon {
                line: line_no,
                content: line.to_string(),
            });
        };
        lexicon.insert(word.to_lowercase(), valence);
    }
    Ok(lexicon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_tables_load() {
        let data = ReferenceData::builtin().unwrap();
        assert!(data.is_stop_word("the"));
        assert!(data.is_stop_word("don't"));
        assert!(!data.is_stop_word("love"));
        assert!(data.is_slang_listed("gonna"));
        assert!(data.is_slang_listed("ain't"));
        assert_eq!(data.valence("love"), Some(3.2));
        assert_eq!(data.valence("table"), None);
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = ReferenceData::builtin().unwrap();
        let b = ReferenceData::builtin().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_empty_table_is_config_error() {
        let err = ReferenceData::from_sources("# only a comment\n\n", "gonna", "good 1.9").unwrap_err();
        assert!(matches!(err, ReferenceError::EmptyTable("stop word")));

        let err = ReferenceData::from_sources("the", "", "good 1.9").unwrap_err();
        assert!(matches!(err, ReferenceError::EmptyTable("slang")));
    }

    #[test]
    fn test_malformed_lexicon_line() {
        let err = ReferenceData::from_sources("the", "gonna", "good 1.9\nbad\n").unwrap_err();
        match err {
            ReferenceError::MalformedLexicon { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_overrides_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Yeet").unwrap();
        writeln!(file, "bussin").unwrap();

        let data = ReferenceData::load(None, Some(file.path()), None).unwrap();
        assert!(data.is_slang_listed("yeet"));
        assert!(!data.is_slang_listed("gonna"));
        assert_eq!(data.slang_count(), 2);
        assert!(data.is_stop_word("and"));
        assert_eq!(
            data.stop_word_count(),
            ReferenceData::builtin().unwrap().stop_word_count()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let err = ReferenceData::load(Some(Path::new("/definitely/not/here.txt")), None, None).unwrap_err();
        assert!(matches!(err, ReferenceError::Io { .. }));
    }
}
