use crate::cluster::FileRecord;
use crate::error::Error;
use glob::Pattern;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Which directory entries become [`FileRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    /// Lowercase, dot-prefixed. Empty accepts every extension.
    pub extensions: Vec<String>,
    pub ignore_patterns: Vec<Pattern>,
    pub recursive: bool,
}

impl ScanFilter {
    pub fn new(extensions: &[String], ignore_globs: &[String], recursive: bool) -> Self {
        let ignore_patterns = ignore_globs
            .iter()
            .filter_map(|glob| match Pattern::new(glob) {
                Ok(p) => Some(p),
                Err(e) => {
                    error!("Invalid glob pattern '{}': {}", glob, e);
                    None
                }
            })
            .collect();

        Self {
            extensions: normalize_extensions(extensions),
            ignore_patterns,
            recursive,
        }
    }

    fn accepts_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = format!(".{}", ext.to_lowercase());
                self.extensions.contains(&ext)
            }
            None => false,
        }
    }

    fn is_ignored(&self, path: &Path) -> bool {
        self.ignore_patterns.iter().any(|p| p.matches_path(path))
    }
}

/// Parse a comma separated extension list such as `".txt, epub,DOC"`.
pub fn split_extensions(raw: &str) -> Vec<String> {
    let parts: Vec<String> = raw.split(',').map(str::to_string).collect();
    normalize_extensions(&parts)
}

fn normalize_extensions(raw: &[String]) -> Vec<String> {
    let mut exts: Vec<String> = Vec::new();
    for part in raw {
        let part = part.trim().to_lowercase();
        if part.is_empty() {
            continue;
        }
        let ext = if part.starts_with('.') {
            part
        } else {
            format!(".{}", part)
        };
        if !exts.contains(&ext) {
            exts.push(ext);
        }
    }
    exts.sort();
    exts
}

/// Files collected from one folder for a single analysis run.
#[derive(Debug)]
pub struct Collection {
    pub folder: PathBuf,
    pub files: Vec<FileRecord>,
    pub skipped_unreadable: usize,
    /// Names that normalize to nothing and can never match.
    pub skipped_untitled: usize,
}

/// List `folder` once and build the file batch, sorted by lowercase name then path.
///
/// A missing folder fails the whole request; unreadable entries are skipped.
pub fn collect_files(folder: &Path, filter: &ScanFilter) -> Result<Collection, Error> {
    if !folder.is_dir() {
        return Err(Error::DirectoryNotFound(folder.to_path_buf()));
    }
    let folder = folder.canonicalize()?;

    let mut files = Vec::new();
    let mut skipped_unreadable = 0;
    let mut skipped_untitled = 0;

    let max_depth = if filter.recursive { usize::MAX } else { 1 };
    let walker = WalkDir::new(&folder)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|entry| !filter.is_ignored(entry.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                skipped_unreadable += 1;
                continue;
            }
        };
        if !entry.file_type().is_file() || !filter.accepts_extension(entry.path()) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                warn!("Error reading metadata for {}: {}", entry.path().display(), err);
                skipped_unreadable += 1;
                continue;
            }
        };
        let modified_at = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let record = FileRecord::new(entry.path(), metadata.len(), modified_at);
        if record.normalized.is_empty() {
            debug!("No title characters in {}, skipping", record.name);
            skipped_untitled += 1;
            continue;
        }
        files.push(record);
    }

    if files.is_empty() {
        return Err(Error::NoQualifyingFiles {
            folder,
            extensions: filter.extensions.clone(),
        });
    }

    files.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });

    debug!(
        "Collected {} files from {} ({} unreadable, {} untitled)",
        files.len(),
        folder.display(),
        skipped_unreadable,
        skipped_untitled,
    );

    Ok(Collection {
        folder,
        files,
        skipped_unreadable,
        skipped_untitled,
    })
}
