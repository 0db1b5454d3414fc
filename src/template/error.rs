//! Template parse errors

use thiserror::Error;

/// Errors raised while parsing template source
///
/// Rendering never fails; every structural problem is caught here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// `{{` without a matching `}}`
    #[error("unterminated tag starting on line {line}")]
    UnterminatedTag { line: usize },

    /// `{{}}`, `{{#}}` and friends
    #[error("empty tag name on line {line}")]
    EmptyTag { line: usize },

    /// Tag names are limited to ASCII letters, digits, `_` and `-`
    #[error("invalid tag name '{name}' on line {line}")]
    InvalidName { name: String, line: usize },

    /// Section opened but never closed
    #[error("section '{name}' opened on line {line} is never closed")]
    UnclosedSection { name: String, line: usize },

    /// `{{/name}}` with no open section
    #[error("closing tag '{name}' on line {line} has no matching open section")]
    UnexpectedClose { name: String, line: usize },

    /// `{{/name}}` closing a different section than the innermost one
    #[error("closing tag '{found}' on line {line} does not match open section '{expected}'")]
    MismatchedClose {
        expected: String,
        found: String,
        line: usize,
    },
}

/// Result type alias for template operations
pub type Result<T> = std::result::Result<T, TemplateError>;
