//! Schema validation errors

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A rejected answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Question id (e.g., "radius.auth_port")
    pub question: String,
    pub message: String,
}

impl FieldError {
    pub fn new(question: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.question, self.message)
    }
}

/// Errors raised while collecting answers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// One or more answers failed validation; all of them are reported
    #[error("{} invalid answer(s): {}", errors.len(), join(errors))]
    Invalid { errors: Vec<FieldError> },

    /// Answers file could not be parsed
    #[error("failed to parse answers as {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
}

impl SchemaError {
    /// Field errors carried by [`SchemaError::Invalid`]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Invalid { errors } => errors,
            Self::Parse { .. } => &[],
        }
    }
}

fn join(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;
