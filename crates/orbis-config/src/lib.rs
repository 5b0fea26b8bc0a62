//! Configuration for the Orbis planet generator.
//!
//! Settings persist to disk as a RON file, can be overridden from the command
//! line via clap, and stay forward/backward compatible through `#[serde(default)]`.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{Config, DebugConfig, GenerationConfig, WorkerConfig, default_config_dir};
pub use error::ConfigError;
