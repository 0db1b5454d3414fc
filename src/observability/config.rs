//! Logging Configuration

use std::env;
use std::fmt;
use std::str::FromStr;

use super::ObservabilityError;

/// Filter used when neither `NACFORGE_LOG` nor `RUST_LOG` is set
pub const DEFAULT_FILTER: &str = "warn";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line format
    Pretty,
    /// JSON lines for log aggregation
    Json,
    /// Single-line format
    #[default]
    Compact,
}

impl FromStr for LogFormat {
    type Err = ObservabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" | "text" => Ok(Self::Compact),
            other => Err(ObservabilityError::Config(format!(
                "unknown log format '{}' (expected pretty, json or compact)",
                other
            ))),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Compact => "compact",
        })
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive (e.g., "warn", "nacforge=debug")
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_FILTER.to_string(),
        }
    }
}

impl LogConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `NACFORGE_LOG`: filter directive; falls back to `RUST_LOG`, then "warn"
    /// - `NACFORGE_LOG_FORMAT`: "pretty", "json" or "compact" (default: "compact")
    ///
    /// An unrecognised format falls back to the default.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let filter = var("NACFORGE_LOG")
            .or_else(|| var("RUST_LOG"))
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FILTER.to_string());
        let format = var("NACFORGE_LOG_FORMAT")
            .and_then(|f| f.parse().ok())
            .unwrap_or_default();
        Self { format, filter }
    }

    /// Raise the filter to `debug` (the CLI's `-v`)
    pub fn verbose(mut self) -> Self {
        self.filter = "debug".to_string();
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }
}
