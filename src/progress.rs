/// Trait for reporting scan progress.
///
/// The CLI implements it with indicatif spinners; the HTTP server runs silent.
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_collect_start(&self, _folder: &str) {}
    fn on_collect_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_analyze_start(&self, _total_files: usize) {}
    fn on_analyze_complete(&self, _groups: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
