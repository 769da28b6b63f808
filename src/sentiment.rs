//! Lexicon-based polarity scoring.
//!
//! [`SentimentScorer`] is the seam: the feature extractor only needs the four
//! components. [`LexiconScorer`] is the default, a valence-aware scorer in the
//! VADER family restricted to what survives lyric cleaning (no punctuation or
//! capitalisation cues).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Polarity split of a text. `positive + negative + neutral` is 1 up to rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    /// Normalized sum of valences in [-1, 1]
    pub compound: f64,
}

impl SentimentScores {
    pub fn neutral() -> Self {
        Self {
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            compound: 0.0,
        }
    }
}

pub trait SentimentScorer: Send + Sync {
    /// Score already-normalized text (lower-case, punctuation stripped).
    fn score(&self, text: &str) -> SentimentScores;
}

const BOOST_INCREMENT: f64 = 0.293;
const NEGATION_SCALAR: f64 = -0.74;
const NORMALIZATION_ALPHA: f64 = 15.0;

const NEGATIONS: &[&str] = &[
    "aint", "ain't", "arent", "aren't", "cannot", "cant", "can't", "couldnt", "couldn't",
    "didnt", "didn't", "doesnt", "doesn't", "dont", "don't", "hadnt", "hadn't", "hasnt",
    "hasn't", "havent", "haven't", "isnt", "isn't", "neither", "never", "none", "nope",
    "nor", "not", "nothing", "nowhere", "shouldnt", "shouldn't", "wasnt", "wasn't",
    "werent", "weren't", "without", "wont", "won't", "wouldnt", "wouldn't", "rarely",
    "seldom", "despite",
];

const BOOSTERS_UP: &[&str] = &[
    "absolutely", "amazingly", "awfully", "completely", "deeply", "enormously", "entirely",
    "especially", "extremely", "fully", "greatly", "hella", "highly", "hugely", "incredibly",
    "intensely", "more", "most", "particularly", "purely", "quite", "really", "so",
    "thoroughly", "totally", "tremendously", "unbelievably", "utterly", "very",
];

const BOOSTERS_DOWN: &[&str] = &[
    "almost", "barely", "hardly", "kinda", "less", "little", "marginally", "occasionally",
    "partly", "scarcely", "slightly", "somewhat", "sorta",
];

fn is_negation(token: &str) -> bool {
    NEGATIONS.contains(&token) || token.ends_with("n't")
}

fn booster(token: &str) -> Option<f64> {
    if BOOSTERS_UP.contains(&token) {
        Some(BOOST_INCREMENT)
    } else if BOOSTERS_DOWN.contains(&token) {
        Some(-BOOST_INCREMENT)
    } else {
        None
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Default scorer over a shared valence lexicon.
#[derive(Debug, Clone)]
pub struct LexiconScorer {
    lexicon: Arc<HashMap<String, f64>>,
}

impl LexiconScorer {
    pub fn new(lexicon: Arc<HashMap<String, f64>>) -> Self {
        Self { lexicon }
    }

    /// Valence of `tokens[i]` after booster and negation rules.
    fn token_valence(&self, tokens: &[&str], i: usize) -> f64 {
        let token = tokens[i];
        if booster(token).is_some() {
            return 0.0;
        }
        let Some(&base) = self.lexicon.get(token) else {
            return 0.0;
        };

        let mut valence = base;
        for distance in 1..=3 {
            if i < distance {
                break;
            }
            let previous = tokens[i - distance];
            if !self.lexicon.contains_key(previous) {
                if let Some(boost) = booster(previous) {
                    let mut boost = if valence < 0.0 { -boost } else { boost };
                    if distance == 2 {
                        boost *= 0.95;
                    } else if distance == 3 {
                        boost *= 0.9;
                    }
                    valence += boost;
                }
            }
            if is_negation(previous) {
                valence *= NEGATION_SCALAR;
            }
        }
        valence
    }
}

impl SentimentScorer for LexiconScorer {
    fn score(&self, text: &str) -> SentimentScores {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return SentimentScores::neutral();
        }

        let mut valences: Vec<f64> = (0..tokens.len())
            .map(|i| self.token_valence(&tokens, i))
            .collect();

        // Contrast: what follows "but" outweighs what precedes it.
        if let Some(pivot) = tokens.iter().position(|t| *t == "but") {
            for (i, valence) in valences.iter_mut().enumerate() {
                if i < pivot {
                    *valence *= 0.5;
                } else if i > pivot {
                    *valence *= 1.5;
                }
            }
        }

        let sum: f64 = valences.iter().sum();
        let compound = (sum / (sum * sum + NORMALIZATION_ALPHA).sqrt()).clamp(-1.0, 1.0);

        let mut positive_sum = 0.0;
        let mut negative_sum = 0.0;
        let mut neutral_count = 0.0;
        for &valence in &valences {
            if valence > 0.0 {
                positive_sum += valence + 1.0;
            } else if valence < 0.0 {
                negative_sum += valence - 1.0;
            } else {
                neutral_count += 1.0;
            }
        }

        let total = positive_sum + negative_sum.abs() + neutral_count;
        SentimentScores {
            positive: round3((positive_sum / total).abs()),
            negative: round3((negative_sum / total).abs()),
            neutral: round3((neutral_count / total).abs()),
            compound: round3(compound),
        }
    }
}
