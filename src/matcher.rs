//! Fallback URL selection by longest common substring.

/// A candidate picked by [`best_match_scored`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    /// The candidate exactly as given (original case)
    pub candidate: &'a str,
    /// Position of the candidate in the input sequence
    pub index: usize,
    /// Length in chars of the longest substring shared with the target
    pub match_len: usize,
    /// Chars of the candidate outside that shared substring
    pub remainder: usize,
}

/// Length in chars of the longest contiguous substring shared by `a` and `b`.
pub fn longest_common_substring(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    // prev[j] = length of the common suffix of a[..i] and b[..j]
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    let mut best = 0;

    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb { prev[j] + 1 } else { 0 };
            best = best.max(curr[j + 1]);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    best
}

/// Pick the candidate sharing the longest substring with `target`, ignoring case.
///
/// Ties on match length go to the candidate with the smaller unmatched
/// remainder. Full ties keep the earliest candidate. `None` only for an
/// empty candidate list.
pub fn best_match_scored<'a, S: AsRef<str>>(
    candidates: &'a [S],
    target: &str,
) -> Option<ScoredCandidate<'a>> {
    let target = target.to_lowercase();
    let mut best: Option<ScoredCandidate<'a>> = None;

    for (index, candidate) in candidates.iter().enumerate() {
        let raw = candidate.as_ref();
        let folded = raw.to_lowercase();
        let match_len = longest_common_substring(&folded, &target);
        let remainder = folded.chars().count() - match_len;

        let better = match &best {
            None => true,
            Some(current) => {
                match_len > current.match_len
                    || (match_len == current.match_len && remainder < current.remainder)
            }
        };

        if better {
            best = Some(ScoredCandidate {
                candidate: raw,
                index,
                match_len,
                remainder,
            });
        }
    }

    best
}

/// Like [`best_match_scored`] but returns only the winning candidate.
pub fn best_match<'a, S: AsRef<str>>(candidates: &'a [S], target: &str) -> Option<&'a str> {
    best_match_scored(candidates, target).map(|scored| scored.candidate)
}
