use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad thresholds, empty column names, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Registry file does not exist. Fatal: nothing can be matched without it.
    #[error("registry file not found: {}", .0.display())]
    RegistryNotFound(PathBuf),
    /// Registry lacks required columns. Fatal.
    #[error(
        "registry missing required columns\n  expected: {expected:?}\n  missing:  {missing:?}\n  found:    {found:?}"
    )]
    RegistryMissingColumns {
        expected: Vec<String>,
        missing: Vec<String>,
        found: Vec<String>,
    },
    /// An override table lacks required columns.
    #[error("{table}: missing required columns {missing:?} (found {found:?})")]
    MissingColumns {
        table: &'static str,
        missing: Vec<String>,
        found: Vec<String>,
    },
    /// Competition dataset could not be parsed or written.
    #[error("dataset error: {0}")]
    Dataset(#[from] csv::Error),
    /// Underlying table read failed.
    #[error(transparent)]
    Table(#[from] kir_io::IoError),
    /// Plain file-system error while writing outputs.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
