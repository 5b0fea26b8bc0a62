//! Command-line argument parsing for the Orbis generator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Orbis command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "orbis", about = "Procedural planet geometry generator")]
pub struct CliArgs {
    /// Icosahedron subdivision level.
    #[arg(long)]
    pub detail: Option<u32>,

    /// Scatter multiplier (relative to face edge length).
    #[arg(long)]
    pub scatter: Option<f64>,

    /// Seed for the vegetation draw.
    #[arg(long)]
    pub vegetation_seed: Option<u64>,

    /// Built-in biome preset (temperate, desert).
    #[arg(long)]
    pub preset: Option<String>,

    /// Biome description file (RON).
    #[arg(long)]
    pub biome: Option<PathBuf>,

    /// Number of worker threads.
    #[arg(long)]
    pub threads: Option<usize>,

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
        if let Some(detail) = args.detail {
            self.generation.detail = detail;
        }
        if let Some(scatter) = args.scatter {
            self.generation.scatter = scatter;
        }
        if let Some(seed) = args.vegetation_seed {
            self.generation.vegetation_seed = Some(seed);
        }
        if let Some(ref preset) = args.preset {
            self.generation.biome_preset = preset.clone();
        }
        if let Some(ref biome) = args.biome {
            self.generation.biome_file = Some(biome.clone());
        }
        if let Some(threads) = args.threads {
            self.worker.threads = threads;
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
            detail: None,
            scatter: None,
            vegetation_seed: None,
            preset: None,
            biome: None,
            threads: None,
            log_level: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            detail: Some(8),
            biome: Some(PathBuf::from("desert.ron")),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.generation.detail, 8);
        assert_eq!(
            config.generation.biome_file.as_deref(),
            Some(std::path::Path::new("desert.ron"))
        );
        // Non-overridden fields retain defaults
        assert_eq!(config.generation.scatter, 1.2);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args =
            CliArgs::try_parse_from(["orbis", "--detail", "4", "--vegetation-seed", "99"]).unwrap();
        assert_eq!(args.detail, Some(4));
        assert_eq!(args.vegetation_seed, Some(99));
        assert!(args.scatter.is_none());
    }
}
