//! Command-line argument parsing for the Helios viewer.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Helios command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "helios", about = "Animated solar-system viewer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Number of background stars.
    #[arg(long)]
    pub star_count: Option<u32>,

    /// Seed for starfield placement and initial orbit angles.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Exit after this many frames (0 = run until closed).
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(count) = args.star_count {
            self.scene.star_count = count;
        }
        if let Some(seed) = args.seed {
            self.scene.seed = seed;
        }
        if let Some(frames) = args.max_frames {
            self.debug.max_frames = frames;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            width: None,
            height: None,
            fullscreen: None,
            star_count: None,
            seed: None,
            max_frames: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            star_count: Some(100),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.scene.star_count, 100);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.scene.seed, 0);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }
}
