use crate::cluster::normalize::parse_stopwords;
use crate::cluster::{AnalysisOptions, LinkThresholds};
use crate::error::Error;
use crate::scanner::ScanFilter;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const PREFERENCES_FILE: &str = "title_duper_prefs.toml";

/// Noise fragments common in web-novel file names: kinship terms, uploader and
/// edition tags.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "妈妈", "姐姐", "妹妹", "哥哥", "弟弟", "指挥官", "调教", "作者", "搜书吧", "第一人称",
    "完整版", "修订版", "番外", "fgo", "coser", "cos",
];

pub const DEFAULT_EXTENSIONS: &[&str] = &[".txt", ".doc", ".docx", ".epub"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub request_timeout_secs: u64,
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:18080".to_string(),
            request_timeout_secs: 60,
            max_sessions: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub default_path: String,
    pub extensions: Vec<String>,
    pub stopwords: Vec<String>,
    pub lengths: Vec<usize>,
    pub min_pair_matches: usize,
    pub max_df_abs: usize,
    pub max_df_ratio: f64,
    pub recursive: bool,
    pub ignore_patterns: Vec<String>,
    pub thresholds: LinkThresholds,
    pub server: ServerConfig,
    pub preferences_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_path: ".".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
            lengths: vec![2, 3, 4, 5, 6],
            min_pair_matches: 2,
            max_df_abs: 120,
            max_df_ratio: 0.04,
            recursive: false,
            ignore_patterns: Vec::new(),
            thresholds: LinkThresholds::default(),
            server: ServerConfig::default(),
            preferences_path: PREFERENCES_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Validated engine options for this configuration.
    pub fn analysis_options(&self) -> Result<AnalysisOptions, Error> {
        Ok(AnalysisOptions::new(
            &self.lengths,
            self.min_pair_matches,
            self.max_df_abs,
            self.max_df_ratio,
            &self.stopwords,
        )?
        .with_thresholds(self.thresholds.clone()))
    }

    pub fn scan_filter(&self) -> ScanFilter {
        ScanFilter::new(&self.extensions, &self.ignore_patterns, self.recursive)
    }
}

/// Load configuration from `Config.toml`, the saved preferences and the environment.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let prefs = std::env::var("TITLE_DUPER__PREFERENCES_PATH")
        .unwrap_or_else(|_| PREFERENCES_FILE.to_string());
    load_configuration_from(Path::new("Config"), Path::new(&prefs))
}

/// Layered load: built-in defaults, then `config_base` (any format the `config` crate
/// detects, optional), then the preferences file (optional), then `TITLE_DUPER__*`
/// environment variables.
pub fn load_configuration_from(
    config_base: &Path,
    preferences: &Path,
) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(&config_base.to_string_lossy()).required(false))
        .add_source(ConfigFile::from(preferences).required(false))
        .add_source(
            Environment::with_prefix("TITLE_DUPER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("extensions")
                .with_list_parse_key("stopwords")
                .with_list_parse_key("lengths")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;

    let mut config = builder.try_deserialize::<AppConfig>()?;
    config.preferences_path = preferences.to_string_lossy().into_owned();
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// User choices remembered between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopwords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_path: Option<String>,
}

/// Read the preferences file; a missing file yields empty preferences.
pub fn load_preferences(path: &Path) -> Result<Preferences, Error> {
    if !path.exists() {
        return Ok(Preferences::default());
    }
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

fn update_preferences(path: &Path, apply: impl FnOnce(&mut Preferences)) -> Result<Preferences, Error> {
    let mut prefs = load_preferences(path)?;
    apply(&mut prefs);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(&prefs)?)?;
    Ok(prefs)
}

/// Persist a stopword list. Returns the normalized, longest-first list that was saved.
pub fn save_stopwords(path: &Path, raw: &str) -> Result<Vec<String>, Error> {
    let words = parse_stopwords(raw);
    update_preferences(path, |p| p.stopwords = Some(words.clone()))?;
    info!("Saved {} stopwords to {}", words.len(), path.display());
    Ok(words)
}

/// Persist the default scan folder. Returns the canonical path that was saved.
pub fn save_default_path(path: &Path, folder: &Path) -> Result<PathBuf, Error> {
    if !folder.is_dir() {
        return Err(Error::DirectoryNotFound(folder.to_path_buf()));
    }
    let canonical = folder.canonicalize()?;
    let text = canonical.to_string_lossy().into_owned();
    update_preferences(path, |p| p.default_path = Some(text))?;
    info!("Saved default path {}", canonical.display());
    Ok(canonical)
}
