//! Process-wide `tracing` subscriber setup.

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("Failed to init subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Builds the filter: `RUST_LOG` when set, otherwise the configured directives.
pub fn env_filter(config: &LogConfig) -> Result<EnvFilter, LoggingError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(&config.filter)?),
    }
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<(), LoggingError> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }

    tracing::debug!(filter = %config.filter, json = config.json, "logging initialized");
    Ok(())
}
