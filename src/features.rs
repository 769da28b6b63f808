//! Per-song lyric features: structure, vocabulary and sentiment.

use crate::reference::ReferenceData;
use crate::sentiment::SentimentScorer;
use crate::text::{clean_lyrics, ApostrophePolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Section tags counted by [`LyricsAnalyzer::section_counts`], in match priority order.
pub const SECTION_TAGS: [&str; 4] = ["intro", "outro", "verse", "chorus"];

/// Keys of a feature record, in output order.
pub const FEATURE_KEYS: [&str; 16] = [
    "intro_cnt",
    "outro_cnt",
    "verse_cnt",
    "chorus_cnt",
    "line_cnt",
    "word_cnt",
    "unique_word_cnt",
    "stop_word_cnt",
    "slang_word_cnt",
    "unique_word_ratio",
    "stop_word_ratio",
    "slang_word_ratio",
    "positive",
    "negative",
    "neutral",
    "compound",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FeatureError {
    /// No lyrics text, or an empty one
    #[error("lyrics text not found or empty")]
    NotFound,
    /// A ratio over zero tokens
    #[error("ratio undefined: lyrics contain no words")]
    DivisionUndefined,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionCounts {
    pub intro: usize,
    pub outro: usize,
    pub verse: usize,
    pub chorus: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalCounts {
    pub total: usize,
    pub unique: usize,
    pub stop_words: usize,
    pub slang: usize,
}

/// The fixed-schema record for one song. Ratios are `None` when the lyrics
/// have no words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricsFeatures {
    pub intro_cnt: usize,
    pub outro_cnt: usize,
    pub verse_cnt: usize,
    pub chorus_cnt: usize,
    pub line_cnt: usize,
    pub word_cnt: usize,
    pub unique_word_cnt: usize,
    pub stop_word_cnt: usize,
    pub slang_word_cnt: usize,
    pub unique_word_ratio: Option<f64>,
    pub stop_word_ratio: Option<f64>,
    pub slang_word_ratio: Option<f64>,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub compound: f64,
}

impl LyricsFeatures {
    /// Flat key/value view in [`FEATURE_KEYS`] order; absent ratios are `null`.
    pub fn to_map(&self) -> serde_json::Map<String, serde_json::Value> {
        let value = serde_json::to_value(self).unwrap_or_default();
        let mut object = match value {
            serde_json::Value::Object(object) => object,
            _ => serde_json::Map::new(),
        };
        FEATURE_KEYS
            .iter()
            .map(|key| {
                let value = object.remove(*key).unwrap_or(serde_json::Value::Null);
                (key.to_string(), value)
            })
            .collect()
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Analyzer over one song's raw lyrics.
///
/// Derived views (lines, clean text, tokens) are computed once on
/// construction; every computation afterwards is pure.
pub struct LyricsAnalyzer<'a> {
    lines: Vec<String>,
    clean: String,
    tokens: Vec<String>,
    reference: &'a ReferenceData,
    scorer: &'a dyn SentimentScorer,
}

impl<'a> LyricsAnalyzer<'a> {
    /// Fails with [`FeatureError::NotFound`] for absent or empty text.
    pub fn new(
        raw: Option<&str>,
        reference: &'a ReferenceData,
        scorer: &'a dyn SentimentScorer,
    ) -> Result<Self, FeatureError> {
        let raw = match raw {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(FeatureError::NotFound),
        };

        let lines: Vec<String> = raw
            .split('\n')
            .filter(|line| !line.is_empty())
            .map(str::to_lowercase)
            .collect();
        let clean = clean_lyrics(&lines.join("\n"), ApostrophePolicy::Keep);
        let tokens = clean.split_whitespace().map(str::to_string).collect();

        Ok(Self {
            lines,
            clean,
            tokens,
            reference,
            scorer,
        })
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn clean_text(&self) -> &str {
        &self.clean
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Count lines whose first word opens a known section tag. Each line
    /// counts once, for the first tag in [`SECTION_TAGS`] it matches.
    pub fn section_counts(&self) -> SectionCounts {
        let mut counts = SectionCounts::default();
        for line in &self.lines {
            let Some(first) = line.split_whitespace().next() else {
                continue;
            };
            let Some(tag) = first.strip_prefix('[') else {
                continue;
            };
            match SECTION_TAGS.iter().find(|name| tag.starts_with(**name)) {
                Some(&"intro") => counts.intro += 1,
                Some(&"outro") => counts.outro += 1,
                Some(&"verse") => counts.verse += 1,
                Some(&"chorus") => counts.chorus += 1,
                _ => {}
            }
        }
        counts
    }

    /// A token is slang when listed, or when it starts or ends with an
    /// apostrophe (elisions like `'cause` or `nothin'`).
    pub fn is_slang(&self, token: &str) -> bool {
        token.starts_with('\'') || token.ends_with('\'') || self.reference.is_slang_listed(token)
    }

    pub fn lexical_counts(&self) -> LexicalCounts {
        let unique: HashSet<&str> = self.tokens.iter().map(String::as_str).collect();
        LexicalCounts {
            total: self.tokens.len(),
            unique: unique.len(),
            stop_words: self
                .tokens
                .iter()
                .filter(|t| self.reference.is_stop_word(t))
                .count(),
            slang: self.tokens.iter().filter(|t| self.is_slang(t)).count(),
        }
    }

    fn ratio(part: usize, total: usize) -> Result<f64, FeatureError> {
        if total == 0 {
            return Err(FeatureError::DivisionUndefined);
        }
        Ok(round3(part as f64 / total as f64))
    }

    pub fn unique_ratio(&self) -> Result<f64, FeatureError> {
        let counts = self.lexical_counts();
        Self::ratio(counts.unique, counts.total)
    }

    pub fn stop_word_ratio(&self) -> Result<f64, FeatureError> {
        let counts = self.lexical_counts();
        Self::ratio(counts.stop_words, counts.total)
    }

    pub fn slang_ratio(&self) -> Result<f64, FeatureError> {
        let counts = self.lexical_counts();
        Self::ratio(counts.slang, counts.total)
    }

    pub fn sentiment(&self) -> crate::sentiment::SentimentScores {
        self.scorer.score(&self.clean)
    }

    /// Compute the full record. Ratios that are undefined come back `None`.
    pub fn extract(&self) -> LyricsFeatures {
        let sections = self.section_counts();
        let counts = self.lexical_counts();
        let sentiment = self.sentiment();

        let ratio = |part| match Self::ratio(part, counts.total) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!("{}", e);
                None
            }
        };

        LyricsFeatures {
            intro_cnt: sections.intro,
            outro_cnt: sections.outro,
            verse_cnt: sections.verse,
            chorus_cnt: sections.chorus,
            line_cnt: self.lines.len(),
            word_cnt: counts.total,
            unique_word_cnt: counts.unique,
            stop_word_cnt: counts.stop_words,
            slang_word_cnt: counts.slang,
            unique_word_ratio: ratio(counts.unique),
            stop_word_ratio: ratio(counts.stop_words),
            slang_word_ratio: ratio(counts.slang),
            positive: sentiment.positive,
            negative: sentiment.negative,
            neutral: sentiment.neutral,
            compound: sentiment.compound,
        }
    }
}

/// Convenience wrapper: analyze `raw` and extract in one call.
pub fn extract_features(
    raw: Option<&str>,
    reference: &ReferenceData,
    scorer: &dyn SentimentScorer,
) -> Result<LyricsFeatures, FeatureError> {
    Ok(LyricsAnalyzer::new(raw, reference, scorer)?.extract())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::{LexiconScorer, SentimentScores};
    use std::sync::Arc;

    struct FixedScorer;

    impl SentimentScorer for FixedScorer {
        fn score(&self, _text: &str) -> SentimentScores {
            SentimentScores {
                positive: 0.25,
                negative: 0.25,
                neutral: 0.5,
                compound: 0.0,
            }
        }
    }

    fn reference() -> Arc<ReferenceData> {
        ReferenceData::builtin().unwrap()
    }

    #[test]
    fn test_sections_and_counts() {
        let refs = reference();
        let analyzer =
            LyricsAnalyzer::new(Some("[Chorus]\nhello world\n[Verse]\nfoo bar"), &refs, &FixedScorer).unwrap();

        assert_eq!(
            analyzer.section_counts(),
            SectionCounts {
                intro: 0,
                outro: 0,
                verse: 1,
                chorus: 1
            }
        );
        let counts = analyzer.lexical_counts();
        assert_eq!(counts.total, 4);
        assert_eq!(counts.unique, 4);
        assert_eq!(analyzer.clean_text(), "hello world foo bar");
        assert_eq!(analyzer.lines(), ["[Chorus]", "hello world", "[Verse]", "foo bar"]);
        assert_eq!(analyzer.tokens(), ["hello", "world", "foo", "bar"]);
    }

    #[test]
    fn test_section_tags_need_line_start() {
        let refs = reference();
        let raw = "[Intro: Artist]\n[Verse 1]\nsing along [chorus]\n[Outro]\n[Verse 2]\n[Bridge]";
        let counts = LyricsAnalyzer::new(Some(raw), &refs, &FixedScorer).unwrap().section_counts();
        assert_eq!(counts.intro, 1);
        assert_eq!(counts.verse, 2);
        assert_eq!(counts.outro, 1);
        assert_eq!(counts.chorus, 0);
    }

    #[test]
    fn test_absent_or_empty_text_is_not_found() {
        let refs = reference();
        assert_eq!(
            LyricsAnalyzer::new(None, &refs, &FixedScorer).err(),
            Some(FeatureError::NotFound)
        );
        assert_eq!(
            LyricsAnalyzer::new(Some(""), &refs, &FixedScorer).err(),
            Some(FeatureError::NotFound)
        );
    }

    #[test]
    fn test_all_punctuation_has_no_ratios() {
        let refs = reference();
        let analyzer = LyricsAnalyzer::new(Some("!!! ... ???"), &refs, &FixedScorer).unwrap();
        assert_eq!(analyzer.clean_text(), "");
        assert_eq!(analyzer.unique_ratio(), Err(FeatureError::DivisionUndefined));
        assert_eq!(analyzer.stop_word_ratio(), Err(FeatureError::DivisionUndefined));
        assert_eq!(analyzer.slang_ratio(), Err(FeatureError::DivisionUndefined));

        let features = analyzer.extract();
        assert_eq!(features.word_cnt, 0);
        assert_eq!(features.unique_word_ratio, None);
        assert_eq!(features.stop_word_ratio, None);
        assert_eq!(features.slang_word_ratio, None);
    }

    #[test]
    fn test_stop_words_and_slang() {
        let refs = reference();
        let raw = "I'm gonna love you 'til the end\nNothin' can stop the feelin'";
        let analyzer = LyricsAnalyzer::new(Some(raw), &refs, &FixedScorer).unwrap();
        let counts = analyzer.lexical_counts();

        // i'm gonna love you 'til the end nothin' can stop the feelin'
        assert_eq!(counts.total, 12);
        assert_eq!(counts.unique, 11);
        // you, the, the, can
        assert_eq!(counts.stop_words, 4);
        // gonna, 'til, nothin', feelin'
        assert_eq!(counts.slang, 4);
        assert_eq!(analyzer.slang_ratio(), Ok(0.333));
    }

    #[test]
    fn test_ratios_rounded_and_bounded() {
        let refs = reference();
        let analyzer = LyricsAnalyzer::new(Some("la la la hey"), &refs, &FixedScorer).unwrap();
        assert_eq!(analyzer.unique_ratio(), Ok(0.5));
        for ratio in [
            analyzer.unique_ratio().unwrap(),
            analyzer.stop_word_ratio().unwrap(),
            analyzer.slang_ratio().unwrap(),
        ] {
            assert!((0.0..=1.0).contains(&ratio));
        }
    }

    #[test]
    fn test_extract_is_stable() {
        let refs = reference();
        let scorer = LexiconScorer::new(refs.lexicon());
        let raw = "[Verse]\nI love the sunshine\n[Chorus]\nBut the rain brings pain";
        let first = extract_features(Some(raw), &refs, &scorer).unwrap();
        let second = extract_features(Some(raw), &refs, &scorer).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.line_cnt, 4);
        assert_eq!(first.chorus_cnt, 1);
        assert_eq!(first.verse_cnt, 1);
    }

    #[test]
    fn test_to_map_has_fixed_keys() {
        let refs = reference();
        let features = extract_features(Some("?!"), &refs, &FixedScorer).unwrap();
        let map = features.to_map();
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys.len(), FEATURE_KEYS.len());
        for key in FEATURE_KEYS {
            assert!(map.contains_key(key));
        }
        assert!(map["unique_word_ratio"].is_null());
        assert_eq!(map["word_cnt"], serde_json::json!(0));
        assert_eq!(map["neutral"], serde_json::json!(0.5));
    }
}
