//! Collapse a catalog artist's free-form genre tags into one label.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Labels a song can end up with
pub const GENRES: [&str; 22] = [
    "pop",
    "rock",
    "hip-hop",
    "rap",
    "r&b",
    "soul",
    "electronic",
    "dance",
    "country",
    "jazz",
    "classical",
    "reggae",
    "alternative",
    "indie",
    "folk",
    "metal",
    "punk",
    "blues",
    "world",
    "funk",
    "disco",
    "gospel",
];

const ALIASES: &[(&str, &str)] = &[
    ("canadian hip hop", "hip-hop"),
    ("lgbtq+ hip hop", "hip-hop"),
    ("hip hop", "hip-hop"),
    ("hip pop", "hip-hop"),
    ("metalcore", "metal"),
    ("k-pop", "pop"),
];

fn alias(tag: &str) -> &str {
    ALIASES
        .iter()
        .find(|(from, _)| tag.eq_ignore_ascii_case(from))
        .map(|&(_, to)| to)
        .unwrap_or(tag)
}

/// Split `tag` around its first "hip hop", keeping the non-empty pieces.
fn partition_hip_hop(tag: &str) -> Vec<&str> {
    match tag.find("hip hop") {
        Some(start) => {
            let end = start + "hip hop".len();
            [&tag[..start], &tag[start..end], &tag[end..]]
                .into_iter()
                .filter(|piece| !piece.is_empty())
                .collect()
        }
        None => vec![tag],
    }
}

/// Every known genre found in the tags, with its number of hits, in
/// [`GENRES`] order.
pub fn genre_counts<S: AsRef<str>>(artist_genres: &[S]) -> Vec<(&'static str, usize)> {
    let dehyphenated: Vec<String> = artist_genres
        .iter()
        .map(|tag| tag.as_ref().replace('-', " "))
        .collect();

    let words: Vec<&str> = dehyphenated
        .iter()
        .flat_map(|tag| partition_hip_hop(tag))
        .map(alias)
        .flat_map(str::split_whitespace)
        .collect();

    GENRES
        .iter()
        .map(|&genre| {
            let hits = words
                .iter()
                .filter(|word| **word != "trap" && word.contains(genre))
                .count();
            (genre, hits)
        })
        .filter(|&(_, hits)| hits > 0)
        .collect()
}

/// Pick one genre, weighted by how often it was recognized. `None` when no
/// tag names a known genre.
pub fn common_genre<S: AsRef<str>, R: Rng + ?Sized>(artist_genres: &[S], rng: &mut R) -> Option<&'static str> {
    let counts = genre_counts(artist_genres);
    if counts.is_empty() {
        return None;
    }

    let weights = WeightedIndex::new(counts.iter().map(|&(_, hits)| hits)).ok()?;
    Some(counts[weights.sample(rng)].0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_hip_hop_aliases() {
        let counts = genre_counts(&["canadian hip hop", "hip pop"]);
        assert_eq!(counts, vec![("hip-hop", 2)]);
    }

    #[test]
    fn test_hyphen_and_substring_matching() {
        let counts = genre_counts(&["k-pop", "metalcore", "neo-soul", "dance pop"]);
        assert_eq!(counts, vec![("pop", 2), ("soul", 1), ("dance", 1), ("metal", 1)]);
    }

    #[test]
    fn test_trap_is_not_rap() {
        assert!(genre_counts(&["trap"]).is_empty());
        assert_eq!(genre_counts(&["trap", "rap"]), vec![("rap", 1)]);
    }

    #[test]
    fn test_unknown_genres() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(common_genre(&["vaporwave", "chillhop"], &mut rng), None);
        let empty: [&str; 0] = [];
        assert_eq!(common_genre(&empty, &mut rng), None);
    }

    #[test]
    fn test_single_genre_is_certain() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            assert_eq!(common_genre(&["album rock", "classic rock"], &mut rng), Some("rock"));
        }
    }

    #[test]
    fn test_pick_is_weighted_and_reproducible() {
        let tags = ["pop", "dance pop", "pop rock", "rock"];
        let picks: Vec<_> = (0..50)
            .map(|_| common_genre(&tags, &mut StdRng::seed_from_u64(42)))
            .collect();
        assert!(picks.windows(2).all(|w| w[0] == w[1]));

        let mut rng = StdRng::seed_from_u64(3);
        let mut pop = 0;
        for _ in 0..400 {
            match common_genre(&tags, &mut rng) {
                Some("pop") => pop += 1,
                Some("rock") | Some("dance") => {}
                other => panic!("unexpected pick {:?}", other),
            }
        }
        // pop has weight 3 of 6
        assert!(pop > 120 && pop < 280, "pop picked {pop} times");
    }
}
