use tracing_subscriber::EnvFilter;

use crate::errors::LoggingError;

/// Installs the global subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> Result<(), LoggingError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new("info")?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}
