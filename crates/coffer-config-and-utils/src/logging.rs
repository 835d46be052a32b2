//! Logging initialization for the service.
//!
//! Thin wrapper over the observability crate: JSONL to the log file plus
//! compact stderr output for foreground runs.

use observability::LogConfig;
use std::path::PathBuf;

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `level` when set. Unknown levels fall
/// back to `info`.
pub fn init_logging(level: &str, log_path: Option<PathBuf>) {
    observability::init_with_config(LogConfig {
        service_name: "coffer".into(),
        default_level: parse_level(level).to_string(),
        log_path,
        also_stderr: true,
    });
}

/// Map a level name to a [`tracing::Level`]. Unknown names mean `INFO`.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
