use super::ngram::token_len;
use super::FileRecord;
use crate::report::{fmt_size, fmt_time};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

/// Shared snippets kept per group for display.
pub const MAX_SHARED_SNIPPETS: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupFile {
    pub name: String,
    pub path: String,
    pub size_bytes: u64,
    pub size_text: String,
    pub modified_at: i64,
    pub modified: String,
    pub is_latest_by_size: bool,
}

/// Number of shared snippets of one token length within a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthStat {
    pub length: usize,
    pub count: usize,
}

impl fmt::Display for LengthStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}字:{}", self.length, self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub size: usize,
    pub representative: String,
    pub shared_snippets: Vec<String>,
    pub length_stats: Vec<LengthStat>,
    pub length_stats_text: String,
    pub latest_size_bytes: u64,
    pub latest_size_text: String,
    pub old_file_count: usize,
    pub newest_modified_at: i64,
    pub files: Vec<GroupFile>,
}

impl Group {
    pub fn latest_files(&self) -> impl Iterator<Item = &GroupFile> {
        self.files.iter().filter(|f| f.is_latest_by_size)
    }

    pub fn stale_files(&self) -> impl Iterator<Item = &GroupFile> {
        self.files.iter().filter(|f| !f.is_latest_by_size)
    }
}

/// Build the presentation group for one connected component.
pub fn synthesize(
    files: &[FileRecord],
    component: &[usize],
    per_file_tokens: &[AHashSet<String>],
    lengths: &[usize],
) -> Group {
    let mut members: Vec<&FileRecord> = component.iter().map(|&i| &files[i]).collect();
    members.sort_by(|a, b| {
        b.size_bytes
            .cmp(&a.size_bytes)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.path.cmp(&b.path))
    });

    let latest_size_bytes = members.iter().map(|f| f.size_bytes).max().unwrap_or(0);
    let newest_modified_at = members.iter().map(|f| f.modified_at).max().unwrap_or(0);

    let mut local_counter: AHashMap<&str, usize> = AHashMap::new();
    for &i in component {
        for token in &per_file_tokens[i] {
            *local_counter.entry(token.as_str()).or_insert(0) += 1;
        }
    }

    let mut shared: Vec<(&str, usize, usize)> = local_counter
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(token, count)| (token, token_len(token), count))
        .filter(|(_, len, _)| lengths.contains(len))
        .collect();
    shared.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.0.cmp(b.0))
    });

    let length_stats: Vec<LengthStat> = lengths
        .iter()
        .map(|&n| LengthStat {
            length: n,
            count: shared.iter().filter(|(_, len, _)| *len == n).count(),
        })
        .collect();
    let length_stats_text = length_stats
        .iter()
        .map(LengthStat::to_string)
        .collect::<Vec<_>>()
        .join(" / ");

    let shared_snippets: Vec<String> = shared
        .iter()
        .take(MAX_SHARED_SNIPPETS)
        .map(|(token, _, _)| token.to_string())
        .collect();

    let group_files: Vec<GroupFile> = members
        .iter()
        .map(|f| GroupFile {
            name: f.name.clone(),
            path: f.path.clone(),
            size_bytes: f.size_bytes,
            size_text: fmt_size(f.size_bytes),
            modified_at: f.modified_at,
            modified: fmt_time(f.modified_at),
            is_latest_by_size: f.size_bytes >= latest_size_bytes,
        })
        .collect();

    Group {
        size: group_files.len(),
        representative: members.first().map(|f| f.stem.clone()).unwrap_or_default(),
        shared_snippets,
        length_stats,
        length_stats_text,
        latest_size_bytes,
        latest_size_text: fmt_size(latest_size_bytes),
        old_file_count: members
            .iter()
            .filter(|f| f.size_bytes < latest_size_bytes)
            .count(),
        newest_modified_at,
        files: group_files,
    }
}

/// Presentation order: larger groups first, then most recently modified, then by the
/// smallest member path so the order never depends on input order.
pub fn sort_groups(groups: &mut [Group]) {
    groups.sort_by_cached_key(|g| {
        let first_path = g.files.iter().map(|f| f.path.clone()).min().unwrap_or_default();
        (Reverse(g.size), Reverse(g.newest_modified_at), first_path)
    });
}
