//! Crate-level error type
//!
//! Each module keeps its own error enum; [`Error`] wraps them so callers
//! driving the whole pipeline can use a single `?`.

use thiserror::Error;

use crate::generator::GeneratorError;
use crate::schema::SchemaError;
use crate::snapshot::SnapshotError;
use crate::template::TemplateError;

/// Errors produced by nacforge
#[derive(Error, Debug)]
pub enum Error {
    /// A settings value outside its allowed set
    #[error("invalid value '{value}' for {field}")]
    InvalidSetting { field: &'static str, value: String },

    /// Settings or answers file could not be parsed
    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// Settings could not be serialized
    #[error("failed to serialize settings: {0}")]
    Serialize(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Result type alias for nacforge operations
pub type Result<T> = std::result::Result<T, Error>;
