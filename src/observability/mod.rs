//! Logging
//!
//! The library only emits `tracing` events; binaries call [`init`] once to
//! install a subscriber.
//!
//! # Usage
//!
//! ```ignore
//! use nacforge::observability::{self, LogConfig};
//!
//! observability::init(LogConfig::from_env())?;
//! ```

mod config;
mod providers;

use thiserror::Error;
use tracing::debug;

pub use config::{LogConfig, LogFormat, DEFAULT_FILTER};

/// Errors raised while installing the subscriber
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ObservabilityError {
    /// Invalid configuration
    #[error("logging config error: {0}")]
    Config(String),

    /// A global subscriber is already installed, or setup failed
    #[error("logging provider error: {0}")]
    Provider(String),
}

/// Initialize logging
///
/// Fails if called twice in one process.
pub fn init(config: LogConfig) -> Result<(), ObservabilityError> {
    providers::init_tracing(&config)?;
    debug!(format = %config.format, filter = %config.filter, "logging initialized");
    Ok(())
}
