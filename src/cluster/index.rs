use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;
use tracing::debug;

/// Floor applied to the ratio-derived cap so small corpora keep useful tokens.
pub const MIN_RATIO_CAP: usize = 3;

/// Largest document frequency a token may have and still be considered discriminative.
///
/// `min(max_df_abs, max(3, ceil(total * ratio)))` when `ratio > 0`, else `max_df_abs`.
pub fn document_frequency_cap(total_files: usize, max_df_abs: usize, max_df_ratio: f64) -> usize {
    if max_df_ratio > 0.0 {
        let ratio_limit = (total_files as f64 * max_df_ratio).ceil() as usize;
        max_df_abs.min(ratio_limit.max(MIN_RATIO_CAP))
    } else {
        max_df_abs
    }
}

/// Inverted index of tokens that survived corpus frequency filtering.
///
/// Posting lists hold file indices in ascending order. Tokens iterate in lexical order.
#[derive(Debug, Default)]
pub struct TokenIndex {
    postings: BTreeMap<String, Vec<usize>>,
    dropped_rare: usize,
    dropped_common: usize,
}

impl TokenIndex {
    /// Build the index from per-file token sets, discarding tokens seen in fewer than two
    /// files or in more than `max_allowed` files. Filtering happens here, before any pair
    /// expansion, so an ultra-common token never materializes its pairs.
    pub fn build(per_file_tokens: &[AHashSet<String>], max_allowed: usize) -> Self {
        let mut token_docs: AHashMap<&str, Vec<usize>> = AHashMap::new();
        for (file_idx, tokens) in per_file_tokens.iter().enumerate() {
            for token in tokens {
                token_docs.entry(token.as_str()).or_default().push(file_idx);
            }
        }

        let mut index = TokenIndex::default();
        for (token, docs) in token_docs {
            if docs.len() < 2 {
                index.dropped_rare += 1;
                continue;
            }
            if docs.len() > max_allowed {
                index.dropped_common += 1;
                continue;
            }
            index.postings.insert(token.to_string(), docs);
        }

        debug!(
            "Token index: {} kept, {} too rare, {} too common (cap {})",
            index.postings.len(),
            index.dropped_rare,
            index.dropped_common,
            max_allowed,
        );
        index
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.postings
            .iter()
            .map(|(token, docs)| (token.as_str(), docs.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> AHashSet<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_cap_uses_ratio_with_floor() {
        assert_eq!(document_frequency_cap(3, 120, 0.04), 3);
        assert_eq!(document_frequency_cap(1000, 120, 0.04), 40);
        assert_eq!(document_frequency_cap(10_000, 120, 0.04), 120);
    }

    #[test]
    fn test_cap_without_ratio() {
        assert_eq!(document_frequency_cap(1000, 7, 0.0), 7);
    }

    #[test]
    fn test_rare_and_common_tokens_dropped() {
        let files = vec![
            set(&["aa", "bb", "cc"]),
            set(&["aa", "bb"]),
            set(&["aa"]),
            set(&["dd"]),
        ];
        let index = TokenIndex::build(&files, 2);
        // "aa" appears in 3 files > cap 2; "cc" and "dd" appear only once
        let kept: Vec<(&str, &[usize])> = index.iter().collect();
        assert_eq!(kept, vec![("bb", &[0, 1][..])]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_iteration_is_lexical() {
        let files = vec![set(&["zz", "aa", "mm"]), set(&["zz", "aa", "mm"])];
        let index = TokenIndex::build(&files, 5);
        let tokens: Vec<&str> = index.iter().map(|(t, _)| t).collect();
        assert_eq!(tokens, vec!["aa", "mm", "zz"]);
    }
}
