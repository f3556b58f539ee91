//! Log output for the `lens` binary.
//!
//! The library only emits `tracing` events; this module installs the
//! subscriber that prints them. Everything goes to stderr, leaving stdout
//! for rows, summaries and flow graphs.

use crate::config::LoggingConfig;
use crate::error::ComputeError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// A valid `RUST_LOG` wins over `config.level`. A malformed configured
/// level is a [`ComputeError::ConfigError`]. Calling this twice keeps the
/// first subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ComputeError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => level_filter(&config.level)?,
    };

    let json_layer = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let text_layer = (!config.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .without_time()
    });

    if tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .is_err()
    {
        tracing::debug!("subscriber already installed");
    }
    Ok(())
}

/// Parse a level or directive list such as `warn` or `hinge_lens=debug,warn`
pub fn level_filter(level: &str) -> Result<EnvFilter, ComputeError> {
    EnvFilter::try_new(level)
        .map_err(|e| ComputeError::ConfigError(format!("invalid log level {:?}: {}", level, e)))
}
