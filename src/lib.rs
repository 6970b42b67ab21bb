pub mod cluster;
pub mod config;
pub mod deletion;
pub mod engine;
pub mod error;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod server;

pub use cluster::{analyze, AnalysisOptions, AnalysisResult, FileRecord, Group};
pub use config::AppConfig;
pub use engine::{ScanEngine, ScanResult};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
