//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Planet generation defaults.
    pub generation: GenerationConfig,
    /// Background worker pool settings.
    pub worker: WorkerConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Defaults applied to every generation request issued by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Icosahedron subdivision level. Each base face is split into
    /// `(detail + 1)^2` triangles.
    pub detail: u32,
    /// Scatter multiplier, relative to the edge length of one face.
    pub scatter: f64,
    /// Seed for the vegetation draw. `None` uses an OS-seeded generator.
    pub vegetation_seed: Option<u64>,
    /// Built-in biome used when no biome file is set.
    pub biome_preset: String,
    /// Biome description file (RON). Takes precedence over `biome_preset`.
    pub biome_file: Option<PathBuf>,
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of worker threads. `0` picks a count from the CPU core count.
    pub threads: usize,
    /// Maximum number of requests queued or running at once.
    pub max_in_flight: usize,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON log files next to the config in debug builds.
    pub file_logging: bool,
}

// --- Default implementations ---

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            detail: 50,
            scatter: 1.2,
            vegetation_seed: None,
            biome_preset: "temperate".to_string(),
            biome_file: None,
        }
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            max_in_flight: 8,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: true,
        }
    }
}

/// Platform config directory for the generator, e.g. `~/.config/orbis`.
///
/// Falls back to the current directory when the platform has no config dir.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("orbis"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Location of the config file inside `config_dir`.
    pub fn file_path(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `config.ron` from `config_dir`, writing the defaults there first
    /// if the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = Self::file_path(config_dir);
        match Self::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                Ok(config)
            }
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                let config = Self::default();
                config.save(config_dir)?;
                log::info!("Wrote default config to {}", path.display());
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }

    /// Write `config.ron` into `config_dir`, creating the directory if needed.
    ///
    /// The file is written next to its destination and renamed into place, so
    /// a concurrent reader never sees a partial file.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        let path = Self::file_path(config_dir);
        let write_err = |source| ConfigError::Write {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(config_dir).map_err(write_err)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        let staging = path.with_extension("ron.tmp");
        std::fs::write(&staging, serialized).map_err(write_err)?;
        std::fs::rename(&staging, &path).map_err(write_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.generation.detail, 50);
        assert_eq!(config.generation.scatter, 1.2);
        assert_eq!(config.generation.biome_preset, "temperate");
        assert_eq!(config.worker.max_in_flight, 8);
        assert!(config.debug.file_logging);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let config: Config =
            ron::from_str("(generation: (detail: 10, biome_preset: \"desert\"))").unwrap();
        assert_eq!(config.generation.detail, 10);
        assert_eq!(config.generation.biome_preset, "desert");
        assert_eq!(config.generation.scatter, 1.2);
        assert_eq!(config.debug, DebugConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_tolerated() {
        let config: Config = ron::from_str("(worker: (threads: 2, affinity: true))").unwrap();
        assert_eq!(config.worker.threads, 2);
    }

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("orbis");

        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(Config::file_path(&nested).is_file());
        assert!(!nested.join("config.ron.tmp").exists());
    }

    #[test]
    fn test_saved_values_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.generation.vegetation_seed = Some(7);
        config.generation.biome_file = Some(PathBuf::from("biomes/desert.ron"));
        config.worker.threads = 3;
        config.save(dir.path()).unwrap();

        assert_eq!(Config::load_or_create(dir.path()).unwrap(), config);

        // A second save replaces the file and leaves no staging file behind.
        let mut edited = config.clone();
        edited.generation.scatter = 0.5;
        edited.save(dir.path()).unwrap();
        assert_eq!(Config::load_or_create(dir.path()).unwrap(), edited);
        assert!(!Config::file_path(dir.path()).with_extension("ron.tmp").exists());
    }

    #[test]
    fn test_malformed_file_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::file_path(dir.path()), "{{not ron}}").unwrap();

        match Config::load_or_create(dir.path()) {
            Err(ConfigError::Parse { path, .. }) => {
                assert_eq!(path, Config::file_path(dir.path()));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
