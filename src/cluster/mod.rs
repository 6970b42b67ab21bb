//! Filename clustering: groups files whose names likely refer to the same work.
//!
//! Pipeline: normalize → strip stopwords → n-grams → corpus frequency filter →
//! pairwise linking → union-find → group synthesis. Pure and stateless; a run is fully
//! determined by the file batch and the [`AnalysisOptions`].

pub mod group;
pub mod index;
pub mod linker;
pub mod ngram;
pub mod normalize;
pub mod union_find;

pub use group::{Group, GroupFile, LengthStat};
pub use linker::LinkThresholds;

use crate::error::Error;
use ahash::AHashSet;
use index::{document_frequency_cap, TokenIndex};
use linker::{build_pair_profiles, should_link, TitleLens};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, trace};
use union_find::DisjointSet;

/// One scanned file. Immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub name: String,
    pub path: String,
    pub stem: String,
    pub normalized: String,
    pub size_bytes: u64,
    /// Unix seconds.
    pub modified_at: i64,
}

impl FileRecord {
    pub fn new(path: &Path, size_bytes: u64, modified_at: i64) -> Self {
        let name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let normalized = normalize::normalize_title(&stem);
        Self {
            name,
            path: path.to_string_lossy().into_owned(),
            stem,
            normalized,
            size_bytes,
            modified_at,
        }
    }
}

/// Validated analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    pub lengths: Vec<usize>,
    pub min_pair_matches: usize,
    pub max_df_abs: usize,
    pub max_df_ratio: f64,
    /// Normalized, longest first.
    pub stopwords: Vec<String>,
    pub thresholds: LinkThresholds,
}

impl AnalysisOptions {
    /// Clamp and validate raw parameters.
    ///
    /// Lengths below 2 are dropped, the rest deduplicated and sorted; an empty result is
    /// an [`Error::InvalidConfig`]. `min_pair_matches` is raised to 1, `max_df_abs` to 2 and
    /// `max_df_ratio` clamped to `[0, 1]`.
    pub fn new<S: AsRef<str>>(
        lengths: &[usize],
        min_pair_matches: usize,
        max_df_abs: usize,
        max_df_ratio: f64,
        stopwords: &[S],
    ) -> Result<Self, Error> {
        if lengths.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one token length is required".to_string(),
            ));
        }
        let mut lengths: Vec<usize> = lengths.iter().copied().filter(|n| *n >= 2).collect();
        lengths.sort_unstable();
        lengths.dedup();
        if lengths.is_empty() {
            return Err(Error::InvalidConfig(
                "token lengths must be at least 2".to_string(),
            ));
        }
        if !max_df_ratio.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "max_df_ratio must be a finite number, got {}",
                max_df_ratio
            )));
        }

        Ok(Self {
            lengths,
            min_pair_matches: min_pair_matches.max(1),
            max_df_abs: max_df_abs.max(2),
            max_df_ratio: max_df_ratio.clamp(0.0, 1.0),
            stopwords: normalize::prepare_stopwords(stopwords),
            thresholds: LinkThresholds::default(),
        })
    }

    pub fn with_thresholds(mut self, thresholds: LinkThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_files: usize,
    pub group_count: usize,
    pub duplicate_file_count: usize,
    pub params: AnalysisOptions,
    pub groups: Vec<Group>,
}

/// Group `files` into likely-duplicate clusters.
///
/// Fails with [`Error::EmptyInput`] on an empty batch. Zero groups is a valid result.
pub fn analyze(files: &[FileRecord], options: &AnalysisOptions) -> Result<AnalysisResult, Error> {
    if files.is_empty() {
        return Err(Error::EmptyInput);
    }
    let total = files.len();
    let lengths = options.lengths.as_slice();
    let stopwords = options.stopwords.as_slice();

    let per_file_tokens: Vec<AHashSet<String>> = files
        .par_iter()
        .map(|f| ngram::build_file_ngrams(&f.normalized, lengths, stopwords))
        .collect();
    let cleaned_lens: Vec<usize> = files
        .iter()
        .map(|f| normalize::cleaned_len(&f.normalized, stopwords))
        .collect();

    let max_allowed = document_frequency_cap(total, options.max_df_abs, options.max_df_ratio);
    let index = TokenIndex::build(&per_file_tokens, max_allowed);

    let profiles = build_pair_profiles(&index);
    debug!("{} candidate pairs from {} tokens", profiles.len(), index.len());

    let mut sets = DisjointSet::new(total);
    let mut linked = 0usize;
    for (&(a, b), profile) in &profiles {
        let titles = TitleLens {
            a: cleaned_lens[a],
            b: cleaned_lens[b],
        };
        if should_link(
            profile,
            lengths,
            options.min_pair_matches,
            titles,
            &options.thresholds,
        ) {
            trace!(
                "link {} <-> {} via {:?}",
                files[a].name,
                files[b].name,
                profile.sample
            );
            sets.union(a, b);
            linked += 1;
        }
    }

    let mut groups: Vec<Group> = sets
        .components(2)
        .iter()
        .map(|component| group::synthesize(files, component, &per_file_tokens, lengths))
        .collect();
    group::sort_groups(&mut groups);

    let duplicate_file_count = groups.iter().map(|g| g.size).sum();
    info!(
        "Analyzed {} files: {} linked pairs, {} groups, {} files in groups",
        total,
        linked,
        groups.len(),
        duplicate_file_count,
    );

    Ok(AnalysisResult {
        total_files: total,
        group_count: groups.len(),
        duplicate_file_count,
        params: options.clone(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_derives_fields() {
        let rec = FileRecord::new(Path::new("/books/War_and_Peace_v1.txt"), 100, 7);
        assert_eq!(rec.name, "War_and_Peace_v1.txt");
        assert_eq!(rec.stem, "War_and_Peace_v1");
        assert_eq!(rec.normalized, "warandpeacev1");
        assert_eq!(rec.size_bytes, 100);
        assert_eq!(rec.modified_at, 7);
    }

    #[test]
    fn test_options_clamp_and_dedup() {
        let opts = AnalysisOptions::new(&[6, 1, 2, 2, 4], 0, 1, 3.5, &["Cos", "COSER"]).unwrap();
        assert_eq!(opts.lengths, vec![2, 4, 6]);
        assert_eq!(opts.min_pair_matches, 1);
        assert_eq!(opts.max_df_abs, 2);
        assert_eq!(opts.max_df_ratio, 1.0);
        assert_eq!(opts.stopwords, vec!["coser", "cos"]);
    }

    #[test]
    fn test_options_reject_empty_lengths() {
        let none: &[&str] = &[];
        assert!(matches!(
            AnalysisOptions::new(&[], 2, 120, 0.04, none),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisOptions::new(&[0, 1], 2, 120, 0.04, none),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            AnalysisOptions::new(&[2], 2, 120, f64::NAN, none),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_analyze_rejects_empty_batch() {
        let none: &[&str] = &[];
        let opts = AnalysisOptions::new(&[2, 3], 2, 120, 0.04, none).unwrap();
        assert!(matches!(analyze(&[], &opts), Err(Error::EmptyInput)));
    }

    #[test]
    fn test_untitled_file_never_links() {
        let none: &[&str] = &[];
        let opts = AnalysisOptions::new(&[2, 3, 4, 5, 6], 2, 120, 0.04, none).unwrap();
        let files = vec![
            FileRecord::new(Path::new("/b/!!!.txt"), 1, 0),
            FileRecord::new(Path::new("/b/???.txt"), 1, 0),
        ];
        let result = analyze(&files, &opts).unwrap();
        assert_eq!(result.total_files, 2);
        assert_eq!(result.group_count, 0);
    }
}
