use lyric_dataset::matcher::best_match;
use lyric_dataset::text::{clean_lyrics, purify, slugify, ApostrophePolicy, LYRICS_SITE_REPLACEMENTS};

const SAMPLES: &[&str] = &[
    "",
    "[Verse 1: Someone]\nWell-known, I'm HERE!\n[Chorus]\nLa la... la?",
    "Don't stop me now ('cause I'm having a good time)",
    "open [ended bracket\nnever closes",
    "  spaced   out\t\ttabs\n\n\nand blank lines  ",
    "Ça plane pour moi — ÉNORME",
    "!!! ... ???",
    "rock-n-roll ain't noise pollution",
    "[Intro]",
];

#[test]
fn test_clean_lyrics_is_idempotent() {
    for policy in [ApostrophePolicy::Keep, ApostrophePolicy::Strip] {
        for sample in SAMPLES {
            let once = clean_lyrics(sample, policy);
            let twice = clean_lyrics(&once, policy);
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }
}

#[test]
fn test_clean_lyrics_output_alphabet() {
    for sample in SAMPLES {
        let clean = clean_lyrics(sample, ApostrophePolicy::Keep);
        assert!(!clean.contains("  "));
        assert_eq!(clean, clean.trim());
        assert!(
            clean.chars().all(|c| c.is_alphabetic() || c == ' ' || c == '\''),
            "unexpected char in {:?}",
            clean
        );
        assert_eq!(clean, clean.to_lowercase());

        let stripped = clean_lyrics(sample, ApostrophePolicy::Strip);
        assert!(!stripped.contains('\''));
    }
}

#[test]
fn test_slugify_never_emits_spaces() {
    for sample in SAMPLES {
        assert!(!slugify(sample, &[]).contains(' '));
        assert!(!slugify(sample, LYRICS_SITE_REPLACEMENTS).contains(' '));
    }
}

#[test]
fn test_purify_is_url_safe() {
    for sample in SAMPLES {
        let slug = purify(sample);
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        assert!(!slug.starts_with('-') && !slug.ends_with('-'));
    }
}

#[test]
fn test_best_match_ignores_case_everywhere() {
    let candidates = [
        "/Daft-punk-one-more-time-lyrics",
        "/Daft-punk-around-the-world-lyrics",
        "/Daft-punk-one-more-time-remix-lyrics",
    ];
    let upper: Vec<String> = candidates.iter().map(|c| c.to_uppercase()).collect();
    let target = "https://genius.com/daft-punk-one-more-time-lyrics";

    assert_eq!(best_match(&candidates, target), Some(candidates[0]));
    assert_eq!(best_match(&upper, &target.to_uppercase()), Some(upper[0].as_str()));
    assert_eq!(best_match(&upper, target), Some(upper[0].as_str()));
}
