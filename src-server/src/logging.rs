//! Process-wide log setup.

use reportify::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use crate::error::ServerError;

const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Installs the global subscriber. `RUST_LOG` overrides the configured
/// filter. Records from the `log` facade are forwarded into tracing.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ServerError> {
    tracing_log::LogTracer::init().map_err(|e| ServerError::Logging(e.to_string()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter.as_deref().unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (json, pretty) = match config.format {
        LogFormat::Json => (Some(fmt::layer().json()), None),
        LogFormat::Pretty => (None, Some(fmt::layer())),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ServerError::Logging(e.to_string()))
}
