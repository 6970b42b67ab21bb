use crate::cluster::{self, AnalysisOptions, AnalysisResult};
use crate::config::AppConfig;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::scanner::{self, ScanFilter};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub struct ScanEngine {
    options: AnalysisOptions,
    filter: ScanFilter,
}

#[derive(Debug)]
pub struct ScanResult {
    pub folder: PathBuf,
    pub collect_duration: Duration,
    pub analyze_duration: Duration,
    pub skipped_unreadable: usize,
    pub skipped_untitled: usize,
    pub analysis: AnalysisResult,
}

impl ScanEngine {
    /// Validate the configuration up front so a bad length set is rejected before any
    /// file access.
    pub fn new(config: &AppConfig) -> Result<Self, Error> {
        Ok(Self {
            options: config.analysis_options()?,
            filter: config.scan_filter(),
        })
    }

    /// Run the full pipeline over one folder:
    /// 1. Collect file records (single listing)
    /// 2. Cluster names into groups
    pub fn scan(&self, folder: &Path, reporter: &dyn ProgressReporter) -> Result<ScanResult, Error> {
        info!("Scanning {}", folder.display());

        // Phase 1: Collect
        reporter.on_collect_start(&folder.to_string_lossy());
        let collect_start = Instant::now();
        let collection = scanner::collect_files(folder, &self.filter)?;
        let collect_duration = collect_start.elapsed();
        reporter.on_collect_complete(collection.files.len(), collect_duration.as_secs_f64());
        debug!(
            "Collect completed in {:.2}s, {} files",
            collect_duration.as_secs_f64(),
            collection.files.len(),
        );

        // Phase 2: Analyze
        reporter.on_analyze_start(collection.files.len());
        let analyze_start = Instant::now();
        let analysis = cluster::analyze(&collection.files, &self.options)?;
        let analyze_duration = analyze_start.elapsed();
        reporter.on_analyze_complete(analysis.group_count, analyze_duration.as_secs_f64());
        debug!(
            "Analyze completed in {:.2}s, {} groups",
            analyze_duration.as_secs_f64(),
            analysis.group_count,
        );

        Ok(ScanResult {
            folder: collection.folder,
            collect_duration,
            analyze_duration,
            skipped_unreadable: collection.skipped_unreadable,
            skipped_untitled: collection.skipped_untitled,
            analysis,
        })
    }
}
