//! # Observability
//!
//! Centralized tracing setup for coffer services.
//!
//! Services call [`init_with_config`] once at startup and then
//! use plain `tracing` macros everywhere else. Where the log lines end up
//! (stderr, a JSONL file, or both) is decided here and nowhere else.
//!
//! ## File output
//!
//! When [`LogConfig::log_path`] is set, every event is written as one JSON
//! object per line to that file in append mode:
//!
//! ```text
//! {"timestamp":"...","level":"INFO","service":"coffer","pid":4242,"target":"coffer_server::routes","message":"upload stored","fields":{"blob_id":"01J..."}}
//! ```
//!
//! `tail -f ~/.coffer/logs/coffer.jsonl | jq` is the intended way to read it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! observability::init_with_config(observability::LogConfig {
//!     service_name: "coffer".into(),
//!     default_level: "debug".into(),
//!     also_stderr: true,
//!     ..Default::default()
//! });
//! ```

mod file_sink;
mod json_layer;

use std::path::PathBuf;

pub use file_sink::LogFileWriter;
pub use json_layer::{JsonLayer, LogEntry};

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Written as `service` on every JSON line.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset.
    pub default_level: String,
    /// JSONL destination. `None` logs to stderr only.
    pub log_path: Option<PathBuf>,
    /// Mirror events to stderr when `log_path` is set.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "unknown".into(),
            default_level: "info".into(),
            log_path: None,
            also_stderr: false,
        }
    }
}

/// Install the global subscriber. Only the first call in a process has an
/// effect.
///
/// If the log file cannot be opened, logging falls back to stderr and the
/// failure is the first line logged.
pub fn init_with_config(config: LogConfig) {
    match &config.log_path {
        Some(path) => file_sink::init_file_subscriber(&config, path),
        None => init_stderr_only(&config.default_level),
    }
}

pub(crate) fn init_stderr_only(default_level: &str) {
    use tracing_subscriber::util::SubscriberInitExt;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .compact()
        .with_writer(std::io::stderr)
        .finish()
        .try_init();
}

pub(crate) fn env_filter(default_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.service_name, "unknown");
        assert_eq!(config.default_level, "info");
        assert!(config.log_path.is_none());
        assert!(!config.also_stderr);
    }
}
