//! String normalization shared by URL construction and feature extraction.

use regex::Regex;
use std::sync::OnceLock;

/// Replacements applied by [`slugify`] before spaces become hyphens.
pub const DEFAULT_REPLACEMENTS: &[(&str, &str)] = &[
    ("\"", ""),
    ("+", ""),
    ("  ", " "),
    ("'", "-"),
    ("?", ""),
    ("\u{2019}", "-"),
];

/// Overrides used when building lyrics-site URLs: punctuation is dropped
/// instead of hyphenated.
pub const LYRICS_SITE_REPLACEMENTS: &[(&str, &str)] = &[
    (".", ""),
    ("'", ""),
    (",", ""),
    ("\u{2019}", ""),
];

/// Whether [`clean_lyrics`] keeps apostrophes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApostrophePolicy {
    /// Keep `'` so contractions and elisions survive as slang signals
    #[default]
    Keep,
    /// Drop `'` along with all other punctuation
    Strip,
}

/// Convert an artist or title into a URL path fragment.
///
/// `extra` is merged over [`DEFAULT_REPLACEMENTS`]: a key already in the
/// table keeps its position and takes the new value, new keys run after the
/// defaults. Every remaining space becomes `-`. Case is left alone.
pub fn slugify(text: &str, extra: &[(&str, &str)]) -> String {
    let mut table: Vec<(&str, &str)> = DEFAULT_REPLACEMENTS.to_vec();
    for &(from, to) in extra {
        match table.iter_mut().find(|(key, _)| *key == from) {
            Some(entry) => entry.1 = to,
            None => table.push((from, to)),
        }
    }

    let mut result = text.to_string();
    for (from, to) in table {
        if !from.is_empty() {
            result = result.replace(from, to);
        }
    }
    result.replace(' ', "-")
}

/// Normalize raw lyrics for tokenization.
///
/// Lower-cases, removes `[...]` section tags, turns hyphens into spaces,
/// drops everything that is not a letter, whitespace or (per `policy`) an
/// apostrophe, then collapses whitespace. A tag never spans lines: a `[`
/// with no `]` before the end of its line swallows the rest of the text.
pub fn clean_lyrics(raw: &str, policy: ApostrophePolicy) -> String {
    let lowered = raw.to_lowercase();
    let mut kept = String::with_capacity(lowered.len());
    let mut rest = lowered.as_str();

    while let Some(c) = rest.chars().next() {
        if c == '[' {
            match rest.find([']', '\n']) {
                Some(end) if rest[end..].starts_with(']') => {
                    rest = &rest[end + 1..];
                    continue;
                }
                _ => break,
            }
        }

        match c {
            '-' => kept.push(' '),
            '\'' if policy == ApostrophePolicy::Keep => kept.push(c),
            c if c.is_alphabetic() || c.is_whitespace() => kept.push(c),
            _ => {}
        }
        rest = &rest[c.len_utf8()..];
    }

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

static PARENTHESIZED: OnceLock<Regex> = OnceLock::new();
static NON_ALPHANUMERIC: OnceLock<Regex> = OnceLock::new();

fn parenthesized_regex() -> &'static Regex {
    PARENTHESIZED.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap())
}

fn non_alphanumeric_regex() -> &'static Regex {
    NON_ALPHANUMERIC.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\s]").unwrap())
}

/// Aggressive slug used for cache keys and file names.
///
/// `&` becomes `and`, parenthesised spans ("(feat. X)", "(Remastered)") are
/// dropped, only ASCII alphanumerics survive and words are joined by `-`.
pub fn purify(text: &str) -> String {
    let text = text.replace('&', "and");
    let text = parenthesized_regex().replace_all(&text, "");
    let text = non_alphanumeric_regex().replace_all(&text, "");
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_defaults() {
        assert_eq!(slugify("Don't Stop Me Now", &[]), "Don-t-Stop-Me-Now");
        assert_eq!(slugify("Who Are You?", &[]), "Who-Are-You");
        assert_eq!(slugify("\"Heroes\"", &[]), "Heroes");
        assert_eq!(slugify("Me + You", &[]), "Me-You");
        assert_eq!(slugify("", &[]), "");
    }

    #[test]
    fn test_slugify_override_replaces_default() {
        assert_eq!(
            slugify("Don\u{2019}t Stop", LYRICS_SITE_REPLACEMENTS),
            "Dont-Stop"
        );
        assert_eq!(slugify("Mr. Brightside", LYRICS_SITE_REPLACEMENTS), "Mr-Brightside");
        assert_eq!(slugify("Hello, Goodbye", LYRICS_SITE_REPLACEMENTS), "Hello-Goodbye");
    }

    #[test]
    fn test_slugify_new_key_runs_after_defaults() {
        // "-" -> "_" is appended, so hyphens produced by the "'" default are rewritten too
        assert_eq!(slugify("it's", &[("-", "_")]), "it_s");
    }

    #[test]
    fn test_clean_lyrics_strips_tags_and_punctuation() {
        let raw = "[Verse 1: Someone]\nWell-known, I'm HERE!\n[Chorus]\nLa la... la?";
        assert_eq!(
            clean_lyrics(raw, ApostrophePolicy::Keep),
            "well known i'm here la la la"
        );
        assert_eq!(
            clean_lyrics(raw, ApostrophePolicy::Strip),
            "well known im here la la la"
        );
    }

    #[test]
    fn test_clean_lyrics_unterminated_bracket() {
        assert_eq!(clean_lyrics("keep this [drop\nand all of this", ApostrophePolicy::Keep), "keep this");
        assert_eq!(clean_lyrics("open [ended", ApostrophePolicy::Keep), "open");
    }

    #[test]
    fn test_clean_lyrics_keeps_unicode_letters() {
        assert_eq!(clean_lyrics("Café, Niño!", ApostrophePolicy::Keep), "café niño");
    }

    #[test]
    fn test_clean_lyrics_all_punctuation() {
        assert_eq!(clean_lyrics("!!! ... ???", ApostrophePolicy::Keep), "");
    }

    #[test]
    fn test_purify() {
        assert_eq!(purify("Simon & Garfunkel"), "simon-and-garfunkel");
        assert_eq!(purify("Stay (feat. Justin Bieber)"), "stay");
        assert_eq!(purify("  AC/DC  "), "acdc");
    }
}
