//! Subscriber Initialization

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::{LogConfig, LogFormat, ObservabilityError};

/// Install the global subscriber; logs go to stderr so stdout stays clean
/// for generated configuration and JSON output.
pub fn init_tracing(config: &LogConfig) -> Result<(), ObservabilityError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| ObservabilityError::Config(format!("invalid log filter: {}", e)))?;
    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Pretty => subscriber
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        LogFormat::Json => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Compact => subscriber
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
    };

    result.map_err(|e| ObservabilityError::Provider(format!("failed to init tracing: {}", e)))
}
