//! Tracing subscriber bootstrap.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigError, LoggingSection};

/// Install a global `fmt` subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter. Returns `false`
/// when a global subscriber was already installed.
pub fn init(cfg: &LoggingSection) -> Result<bool, ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.filter)
            .map_err(|e| ConfigError::Invalid(format!("logging.filter: {e}")))?,
    };

    let installed = fmt().with_env_filter(filter).with_target(true).try_init().is_ok();
    if installed {
        tracing::info!(filter = %cfg.filter, "tracing initialised");
    }
    Ok(installed)
}
