//! Structured logging for the Orbis generator.
//!
//! Console output with uptime timestamps and thread names (worker threads are
//! named, so per-request logs are easy to follow), plus JSON file logging in
//! debug builds. The filter comes from `RUST_LOG` when set, otherwise from the
//! config's `debug.log_level`.

use orbis_config::Config;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config provide one.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "orbis.log";

/// Install the global subscriber. Call once, before the worker pool starts.
///
/// JSON file output goes to `log_dir/orbis.log` and is only enabled when
/// `debug_build` is set and the config does not turn it off. Closing
/// `create_geometry` spans are reported on the console with their busy time.
///
/// ```no_run
/// let config = orbis_config::Config::default();
/// orbis_log::init_logging(Some(std::path::Path::new("./logs")), true, Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_string(config);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let console_layer = fmt::layer()
        .with_thread_names(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let file_logging = config.is_none_or(|c| c.debug.file_logging);

    if debug_build
        && file_logging
        && let Some(log_path) = log_dir.and_then(prepare_log_file)
        && let Ok(log_file) = std::fs::File::create(&log_path)
    {
        let file_layer = fmt::layer()
            .json()
            .with_writer(log_file)
            .with_ansi(false)
            .with_current_span(true)
            .with_span_list(false);

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Resolve the filter string from the config, falling back to [`DEFAULT_FILTER`].
pub fn filter_string(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.clone(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Create `log_dir` if needed and return the path of the log file inside it.
fn prepare_log_file(log_dir: &Path) -> Option<PathBuf> {
    std::fs::create_dir_all(log_dir).ok()?;
    Some(log_dir.join(LOG_FILE_NAME))
}

/// An `EnvFilter` built from [`DEFAULT_FILTER`].
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
