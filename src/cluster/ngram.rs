use super::normalize::strip_stopwords;
use ahash::AHashSet;

/// Every contiguous `n`-char substring of each whitespace separated segment, for every
/// requested `n`. Purely numeric substrings are skipped: they are volume or chapter
/// numbers, not title fragments.
///
/// Segments are tokenized independently so no token spans a removed stopword.
pub fn segment_ngrams(cleaned: &str, lengths: &[usize]) -> AHashSet<String> {
    let mut tokens = AHashSet::new();
    for segment in cleaned.split_whitespace() {
        let chars: Vec<char> = segment.chars().collect();
        for &n in lengths {
            if n == 0 || chars.len() < n {
                continue;
            }
            for window in chars.windows(n) {
                if window.iter().all(|c| c.is_ascii_digit()) {
                    continue;
                }
                tokens.insert(window.iter().collect());
            }
        }
    }
    tokens
}

/// Strip stopwords from a normalized title and extract its n-gram set.
pub fn build_file_ngrams(
    normalized: &str,
    lengths: &[usize],
    stopwords: &[String],
) -> AHashSet<String> {
    let cleaned = strip_stopwords(normalized, stopwords);
    if cleaned.is_empty() {
        return AHashSet::new();
    }
    segment_ngrams(&cleaned, lengths)
}

/// Length of a token in chars.
#[inline]
pub fn token_len(token: &str) -> usize {
    token.chars().count()
}
