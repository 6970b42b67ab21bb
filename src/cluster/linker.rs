use super::index::TokenIndex;
use super::ngram::token_len;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of shared tokens retained per pair for display.
pub const PAIR_SAMPLE_CAP: usize = 12;

/// Hand-tuned boundaries of the linking heuristic.
///
/// Empirical values, kept overridable so they can be recalibrated from `Config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkThresholds {
    /// Token length from which a single shared fragment is decisive.
    pub long_fragment_len: usize,
    pub min_long_hits: usize,
    pub min_four_hits: usize,
    pub min_three_hits: usize,
    /// Longest cleaned title still treated as "short".
    pub short_title_max_len: usize,
    /// Longest short title that may link on full coverage alone.
    pub short_title_cover_len: usize,
    pub short_title_min_three_hits: usize,
    pub short_title_min_four_hits: usize,
}

impl Default for LinkThresholds {
    fn default() -> Self {
        Self {
            long_fragment_len: 5,
            min_long_hits: 1,
            min_four_hits: 2,
            min_three_hits: 3,
            short_title_max_len: 12,
            short_title_cover_len: 8,
            short_title_min_three_hits: 2,
            short_title_min_four_hits: 1,
        }
    }
}

/// Shared-token profile of an unordered file pair `(a, b)` with `a < b`.
#[derive(Debug, Clone, Default)]
pub struct PairProfile {
    /// Shared token count keyed by token length.
    pub by_len: BTreeMap<usize, usize>,
    pub shared: usize,
    /// First [`PAIR_SAMPLE_CAP`] shared tokens, in index order.
    pub sample: Vec<String>,
}

impl PairProfile {
    fn record(&mut self, token: &str, len: usize) {
        *self.by_len.entry(len).or_insert(0) += 1;
        self.shared += 1;
        if self.sample.len() < PAIR_SAMPLE_CAP {
            self.sample.push(token.to_string());
        }
    }

    pub fn count(&self, len: usize) -> usize {
        self.by_len.get(&len).copied().unwrap_or(0)
    }

    /// Longest length with at least one shared token, 0 when nothing is shared.
    pub fn max_shared_len(&self) -> usize {
        self.by_len
            .iter()
            .rev()
            .find(|(_, c)| **c > 0)
            .map(|(n, _)| *n)
            .unwrap_or(0)
    }
}

/// Expand every posting list into co-occurring pairs and accumulate their profiles.
pub fn build_pair_profiles(index: &TokenIndex) -> AHashMap<(usize, usize), PairProfile> {
    let mut profiles: AHashMap<(usize, usize), PairProfile> = AHashMap::new();
    for (token, docs) in index.iter() {
        let len = token_len(token);
        for i in 0..docs.len() {
            for j in (i + 1)..docs.len() {
                let (a, b) = if docs[i] < docs[j] {
                    (docs[i], docs[j])
                } else {
                    (docs[j], docs[i])
                };
                profiles.entry((a, b)).or_default().record(token, len);
            }
        }
    }
    profiles
}

/// Cleaned (stopword-stripped, gap-free) title lengths of the two files of a pair.
#[derive(Debug, Clone, Copy)]
pub struct TitleLens {
    pub a: usize,
    pub b: usize,
}

impl TitleLens {
    pub fn shorter(&self) -> usize {
        self.a.min(self.b)
    }

    pub fn longer(&self) -> usize {
        self.a.max(self.b)
    }
}

/// Decide whether a pair names the same work. Tiers are evaluated in fixed order:
/// long fragment, 4-char, 3-char, 2-char-only, short-title fallback.
///
/// `lengths` is the requested length set; hits of lengths not requested are ignored.
pub fn should_link(
    profile: &PairProfile,
    lengths: &[usize],
    min_pair_matches: usize,
    titles: TitleLens,
    t: &LinkThresholds,
) -> bool {
    let selected = |n: usize| lengths.contains(&n);
    let count2 = if selected(2) { profile.count(2) } else { 0 };
    let count3 = if selected(3) { profile.count(3) } else { 0 };
    let count4 = if selected(4) { profile.count(4) } else { 0 };
    let long_hits: usize = profile
        .by_len
        .iter()
        .filter(|(n, _)| **n >= t.long_fragment_len && selected(**n))
        .map(|(_, c)| *c)
        .sum();

    if long_hits >= t.min_long_hits.max(1) {
        return true;
    }
    if selected(4) && count4 >= t.min_four_hits {
        return true;
    }
    if selected(3) && count3 >= t.min_three_hits {
        return true;
    }

    // 2-char-only preview mode is exclusive of the short-title fallback.
    if matches!(lengths, [2]) {
        return count2 >= min_pair_matches;
    }

    if titles.longer() <= t.short_title_max_len {
        let shorter = titles.shorter();
        if shorter <= t.short_title_cover_len && profile.max_shared_len() >= shorter {
            return true;
        }
        if count2 >= min_pair_matches
            && (count3 >= t.short_title_min_three_hits || count4 >= t.short_title_min_four_hits)
        {
            return true;
        }
    }

    false
}
