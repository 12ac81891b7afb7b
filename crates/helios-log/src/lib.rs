//! Structured logging for the Helios viewer.
//!
//! Provides structured, filterable logging via the `tracing` ecosystem.
//! Console output carries timestamps and module paths, and the filter
//! integrates with the configuration system for runtime log level control.

use helios_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for the viewer.
///
/// Sets up structured logging with:
/// - Console output with timestamps, module paths, and severity levels
/// - Environment-based filtering (respects RUST_LOG)
/// - Integration with the config system `log_level` setting
pub fn init_logging(config: Option<&Config>) {
    // Determine the filter string
    let filter_str = if let Some(config) = config {
        if !config.debug.log_level.is_empty() {
            config.debug.log_level.clone()
        } else {
            "info,wgpu=warn,naga=warn".to_string()
        }
    } else {
        "info,wgpu=warn,naga=warn".to_string()
    };

    // Base filter: info by default, overridable via RUST_LOG env var
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // Console layer: human-readable format with timestamps
    let console_layer = fmt::layer()
        .with_target(true) // Show module path
        .with_level(true) // Show log level
        .with_timer(fmt::time::uptime()); // Time since startup

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();
}

/// Create an `EnvFilter` with the default filter string.
///
/// Returns a filter that enables:
/// - `info` level for all targets by default
/// - `warn` level for `wgpu` and `naga` to reduce noise
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new("info,wgpu=warn,naga=warn")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_level() {
        let filter = default_env_filter();
        let filter_str = format!("{}", filter);
        assert!(filter_str.contains("wgpu=warn"));
        assert!(filter_str.contains("naga=warn"));
        assert!(filter_str.contains("info"));
    }

    #[test]
    fn test_config_level_used() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        // The init path prefers the config string when present; validate it parses.
        let filter = EnvFilter::new(&config.debug.log_level);
        assert!(format!("{}", filter).contains("debug"));
    }

    #[test]
    fn test_env_filter_parsing() {
        let valid_filters = [
            "info",
            "debug,helios_render=trace",
            "warn,helios_scene=debug",
            "error",
        ];

        for filter_str in &valid_filters {
            let result = EnvFilter::try_from(*filter_str);
            assert!(result.is_ok(), "Failed to parse filter: {}", filter_str);
        }
    }
}
