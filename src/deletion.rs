use crate::cluster::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletionFailure {
    pub path: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub deleted_count: usize,
    pub deleted: Vec<String>,
    pub failed_count: usize,
    pub failed: Vec<DeletionFailure>,
}

impl DeletionReport {
    fn fail(&mut self, path: String, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("Not deleting '{}': {}", path, reason);
        self.failed.push(DeletionFailure { path, reason });
        self.failed_count += 1;
    }
}

/// Paths of every file that is not the largest copy of its group.
pub fn stale_copies(result: &AnalysisResult) -> Vec<String> {
    result
        .groups
        .iter()
        .flat_map(|g| g.stale_files())
        .map(|f| f.path.clone())
        .collect()
}

/// Delete `paths`, refusing anything outside `root`. Each path succeeds or fails on
/// its own; the batch never aborts.
///
/// The analysis that produced these paths is stale afterwards and must be re-run.
pub fn delete_files(paths: &[String], root: &Path) -> DeletionReport {
    let mut report = DeletionReport::default();

    let root = match root.canonicalize() {
        Ok(r) => r,
        Err(e) => {
            error!("Cannot resolve scan root {}: {}", root.display(), e);
            for raw in paths {
                report.fail(raw.clone(), format!("scan root unavailable: {}", e));
            }
            return report;
        }
    };

    for raw in paths {
        let path = Path::new(raw);
        if !path.exists() {
            report.fail(raw.clone(), "file does not exist");
            continue;
        }
        let canonical = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                report.fail(raw.clone(), e.to_string());
                continue;
            }
        };
        let shown = canonical.to_string_lossy().into_owned();
        if !canonical.is_file() {
            report.fail(shown, "not a file");
            continue;
        }
        if !canonical.starts_with(&root) || canonical == root {
            report.fail(shown, "path is outside the scanned folder");
            continue;
        }

        match fs::remove_file(&canonical) {
            Ok(()) => {
                debug!("deleted: {}", shown);
                report.deleted.push(shown);
                report.deleted_count += 1;
            }
            Err(e) => {
                error!("Failed to remove '{}': {}", shown, e);
                report.fail(shown, e.to_string());
            }
        }
    }

    info!(
        "Deletion finished: {} succeeded, {} failed",
        report.deleted_count, report.failed_count
    );
    report
}
