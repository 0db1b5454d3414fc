//! Error types for the nacforge CLI

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path} (run 'nacforge init' to create one)")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file read error
    #[error("Failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration parse error
    #[error("Failed to parse configuration file {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Refusing to overwrite
    #[error("{path} already exists. Use --force to overwrite.")]
    AlreadyExists { path: PathBuf },

    /// Input file read error
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid command-line or configuration value
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// Critical compliance findings
    #[error("Compliance check failed with {count} security issue(s)")]
    ComplianceFailed { count: usize },

    /// Warnings under --strict
    #[error("Strict mode: {count} warning(s) treated as errors")]
    StrictWarnings { count: usize },

    /// Score under --min-score
    #[error("Compliance score {score} is below the required minimum of {minimum}")]
    ScoreBelowMinimum { score: u32, minimum: u32 },

    /// Nothing generated yet for this platform
    #[error("No generated configuration for {vendor}/{platform} in {dir}")]
    NotGenerated {
        vendor: String,
        platform: String,
        dir: PathBuf,
    },

    /// Generated file differs from what the configuration renders to
    #[error("Drift detected: {path} is out of sync with the configuration")]
    DriftDetected { path: PathBuf },

    #[error(transparent)]
    Nacforge(#[from] nacforge::Error),

    #[error(transparent)]
    Template(#[from] nacforge::TemplateError),

    #[error(transparent)]
    Schema(#[from] nacforge::SchemaError),

    #[error(transparent)]
    Generator(#[from] nacforge::GeneratorError),

    #[error(transparent)]
    Snapshot(#[from] nacforge::SnapshotError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create an invalid value error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
