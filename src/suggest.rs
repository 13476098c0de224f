// ==============================================================================
// String Similarity
// ==============================================================================
//
// Edit-distance helpers behind the "did you mean `record`?" hint the parser
// attaches when a mistyped declaration keyword is read as a message.

/// Levenshtein edit distance between two strings, counted in chars.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Largest edit distance at which a candidate still counts as a likely typo.
/// Short words only tolerate one edit.
pub(crate) fn max_edit_distance(len: usize) -> usize {
    if len <= 4 { 1 } else { 2 }
}

/// The candidate closest to `word`, if any is within
/// [`max_edit_distance`]. An exact match is not a suggestion.
pub(crate) fn closest<'a>(word: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let limit = max_edit_distance(word.chars().count());
    candidates
        .map(|candidate| (levenshtein(word, candidate), candidate))
        .filter(|&(distance, _)| distance > 0 && distance <= limit)
        .min_by_key(|&(distance, _)| distance)
        .map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances() {
        assert_eq!(levenshtein("record", "record"), 0);
        assert_eq!(levenshtein("", "xyz"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("protcol", "protocol"), 1);
        assert_eq!(levenshtein("protocoll", "protocol"), 1);
        // A transposition is two edits.
        assert_eq!(levenshtein("recrod", "record"), 2);
        assert_eq!(levenshtein("INT", "int"), 3);
    }

    #[test]
    fn distance_counts_chars_not_bytes() {
        assert_eq!(levenshtein("énum", "enum"), 1);
    }

    #[test]
    fn threshold() {
        assert_eq!(max_edit_distance(4), 1);
        assert_eq!(max_edit_distance(5), 2);
    }

    #[test]
    fn closest_candidate() {
        let keywords = ["record", "enum", "error", "fixed", "protocol"];
        assert_eq!(closest("recrod", keywords.into_iter()), Some("record"));
        assert_eq!(closest("enun", keywords.into_iter()), Some("enum"));
        assert_eq!(closest("protocl", keywords.into_iter()), Some("protocol"));
        assert_eq!(closest("string", keywords.into_iter()), None);
        assert_eq!(closest("record", keywords.into_iter()), None);
    }
}
