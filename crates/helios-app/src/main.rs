//! The binary entry point for the Helios solar-system viewer.

use clap::Parser;
use tracing::{error, info};

use helios_app::window;
use helios_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();

    // Resolve the config directory: --config overrides the platform default.
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("helios")
    });

    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    helios_log::init_logging(Some(&config));
    info!(
        "Starting Helios ({} stars, seed {})",
        config.scene.star_count, config.scene.seed
    );

    if let Err(e) = window::run_with_config(config) {
        error!("Fatal: {e}");
        std::process::exit(1);
    }
}
