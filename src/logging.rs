//! Logger setup.
//!
//! The library itself only emits `tracing` events. Binaries call [`init`]
//! once to print them.

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Installs a global fmt subscriber filtered by `LOGGER_LEVEL`.
///
/// `RUST_LOG`, when set, takes precedence over the configured level; an
/// unparsable level falls back to `info`. Returns `false` when
/// `LOGGER_ENABLED` is off or a subscriber is already installed.
pub fn init(config: &Config) -> bool {
    if !config.logger_enabled {
        return false;
    }
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logger_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
