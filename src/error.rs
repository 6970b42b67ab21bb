use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("No files to analyze")]
    EmptyInput,

    #[error("No files in {} match extensions {:?}", .folder.display(), .extensions)]
    NoQualifyingFiles {
        folder: PathBuf,
        extensions: Vec<String>,
    },

    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML read error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Errors caused by the request itself rather than by the environment.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_)
                | Error::EmptyInput
                | Error::NoQualifyingFiles { .. }
                | Error::DirectoryNotFound(_)
        )
    }
}
