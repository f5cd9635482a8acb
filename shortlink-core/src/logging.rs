//! Logger initialisation
//!
//! Everything in the crate logs through the `log` facade; this installs the
//! `env_logger` backend once at startup.

use crate::config::LoggingConfig;
use log::LevelFilter;

/// Install the global logger at the configured level
///
/// `RUST_LOG`, when set, overrides the configured level. Returns `false` if a
/// logger was already installed, which is harmless.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.level_filter().unwrap_or(LevelFilter::Info))
        .parse_default_env()
        .format_timestamp_millis()
        .format_module_path(config.module_path);

    builder.try_init().is_ok()
}
