use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use title_duper::cluster::normalize::parse_stopwords;
use title_duper::scanner::split_extensions;
use title_duper::AppConfig;

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "title-duper")]
#[command(about = "Group files whose names refer to the same work", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Group files with similar names and print the groups
    Scan(ScanArgs),
    /// Delete every copy smaller than the largest file of its group
    Prune(PruneArgs),
    /// Run the local JSON API
    Serve {
        /// Address to listen on (default: server.bind from configuration)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },
    /// Save the default stopword list
    SetStopwords {
        /// Comma separated stopwords; an empty string clears the list
        stopwords: String,
    },
    /// Save the default folder to scan
    SetDefaultPath {
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct AnalysisArgs {
    /// Folder to scan (default: configured default_path)
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,
    /// Comma separated extensions, e.g. ".txt,.epub"
    #[arg(long, value_name = "LIST")]
    pub ext: Option<String>,
    /// Comma separated stopwords
    #[arg(long, value_name = "LIST")]
    pub stopwords: Option<String>,
    /// Token lengths to match, e.g. "2,3,4,5,6"
    #[arg(long, value_delimiter = ',', value_name = "N,N,...")]
    pub lengths: Option<Vec<usize>>,
    /// Minimum shared 2-char tokens when only length 2 is requested
    #[arg(long)]
    pub min_pair_matches: Option<usize>,
    /// Drop tokens found in more files than this
    #[arg(long)]
    pub max_df_abs: Option<usize>,
    /// Drop tokens found in more than this fraction of files
    #[arg(long)]
    pub max_df_ratio: Option<f64>,
    /// Descend into sub-folders
    #[arg(long)]
    pub recursive: bool,
}

impl AnalysisArgs {
    /// Overlay the flags on `config` and return the folder to scan.
    pub fn apply(&self, config: &mut AppConfig) -> PathBuf {
        if let Some(ext) = &self.ext {
            config.extensions = split_extensions(ext);
        }
        if let Some(raw) = &self.stopwords {
            config.stopwords = parse_stopwords(raw);
        }
        if let Some(lengths) = &self.lengths {
            config.lengths = lengths.clone();
        }
        if let Some(n) = self.min_pair_matches {
            config.min_pair_matches = n;
        }
        if let Some(n) = self.max_df_abs {
            config.max_df_abs = n;
        }
        if let Some(r) = self.max_df_ratio {
            config.max_df_ratio = r;
        }
        if self.recursive {
            config.recursive = true;
        }
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&config.default_path))
    }
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,
    /// Also write the full result as JSON
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
    /// Also write one CSV row per grouped file
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PruneArgs {
    #[command(flatten)]
    pub analysis: AnalysisArgs,
    /// Only show what would be deleted
    #[arg(long)]
    pub dry_run: bool,
    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}
