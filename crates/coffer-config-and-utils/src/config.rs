//! Configuration management for the service.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default public base URL used to build retrieval and approval links.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080";

/// Default upload limit (100 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Default blob chunk size (255 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 255 * 1024;

/// Default lifetime of an approval request.
pub const DEFAULT_APPROVAL_TTL_SECS: u64 = 15 * 60;

/// Main service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Public base URL, e.g. `https://files.example.com`.
    pub base_url: String,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: u64,
    /// Size of each stored chunk, in bytes.
    pub chunk_size: usize,
    /// Shared secret gating access requests. Unset means every request is refused.
    pub access_secret: Option<String>,
    /// Operator address the approval link is sent to.
    pub operator_address: Option<String>,
    /// Webhook receiving approval notifications. Unset means log-only delivery.
    pub notify_webhook_url: Option<String>,
    /// Seconds before an unconsumed approval request expires.
    pub approval_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            chunk_size: DEFAULT_CHUNK_SIZE,
            access_secret: None,
            operator_address: None,
            notify_webhook_url: None,
            approval_ttl_secs: DEFAULT_APPROVAL_TTL_SECS,
        }
    }
}

impl Config {
    /// Load configuration from `config.json` under the base directory,
    /// falling back to defaults, then apply environment overrides.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override fields from `COFFER_*` variables resolved through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).and_then(non_empty);

        if let Some(level) = var("COFFER_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(addr) = var("COFFER_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(url) = var("COFFER_BASE_URL") {
            self.base_url = url;
        }
        if let Some(raw) = var("COFFER_MAX_UPLOAD_BYTES") {
            self.max_upload_bytes = parse_number("COFFER_MAX_UPLOAD_BYTES", &raw)?;
        }
        if let Some(raw) = var("COFFER_CHUNK_SIZE") {
            self.chunk_size = parse_number("COFFER_CHUNK_SIZE", &raw)?;
        }
        if let Some(secret) = var("COFFER_ACCESS_SECRET") {
            self.access_secret = Some(secret);
        }
        if let Some(address) = var("COFFER_OPERATOR_ADDRESS") {
            self.operator_address = Some(address);
        }
        if let Some(url) = var("COFFER_NOTIFY_WEBHOOK_URL") {
            self.notify_webhook_url = Some(url);
        }
        if let Some(raw) = var("COFFER_APPROVAL_TTL_SECS") {
            self.approval_ttl_secs = parse_number("COFFER_APPROVAL_TTL_SECS", &raw)?;
        }
        Ok(())
    }

    /// Reject values the service cannot start with.
    pub fn validate(&self) -> CoreResult<()> {
        self.bind_addr()?;
        self.base_url()?;
        if let Some(webhook) = &self.notify_webhook_url {
            Url::parse(webhook)?;
        }
        if self.chunk_size == 0 {
            return Err(CoreError::Config("chunk_size must be positive".to_string()));
        }
        if self.approval_ttl_secs == 0 {
            return Err(CoreError::Config(
                "approval_ttl_secs must be positive".to_string(),
            ));
        }
        if self.max_upload_bytes == 0 {
            return Err(CoreError::Config(
                "max_upload_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> CoreResult<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| CoreError::Config(format!("invalid bind_addr {}: {}", self.bind_addr, e)))
    }

    /// Get the public base URL as a parsed URL.
    pub fn base_url(&self) -> CoreResult<Url> {
        Url::parse(&self.base_url).map_err(CoreError::from)
    }

    pub fn approval_ttl(&self) -> Duration {
        Duration::from_secs(self.approval_ttl_secs)
    }
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> CoreResult<T> {
    raw.parse()
        .map_err(|_| CoreError::Config(format!("{} must be a non-negative integer, got {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
        assert_eq!(config.max_upload_bytes, 100 * 1024 * 1024);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert!(config.access_secret.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file_fills_missing_fields() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.json");

        std::fs::write(
            &config_path,
            r#"{ "log_level": "debug", "access_secret": "hunter2" }"#,
        )
        .unwrap();

        let config = Config::load_from_file(&config_path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.access_secret.as_deref(), Some("hunter2"));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_config_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().to_path_buf());

        let config = Config {
            log_level: "trace".to_string(),
            operator_address: Some("ops@example.com".to_string()),
            ..Config::default()
        };
        config.save(&paths).unwrap();

        let loaded = Config::load_from_file(&paths.config_file()).unwrap();
        assert_eq!(loaded.log_level, "trace");
        assert_eq!(loaded.operator_address.as_deref(), Some("ops@example.com"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("COFFER_ACCESS_SECRET", "s3cret"),
                ("COFFER_MAX_UPLOAD_BYTES", "1024"),
                ("COFFER_APPROVAL_TTL_SECS", "30"),
                ("COFFER_BASE_URL", "https://files.example.com"),
            ]))
            .unwrap();

        assert_eq!(config.access_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.approval_ttl(), Duration::from_secs(30));
        assert_eq!(config.base_url().unwrap().host_str(), Some("files.example.com"));
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let mut config = Config::default();
        config
            .apply_env(env(&[("COFFER_ACCESS_SECRET", "   ")]))
            .unwrap();
        assert!(config.access_secret.is_none());
    }

    #[test]
    fn test_invalid_numeric_env_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env(env(&[("COFFER_CHUNK_SIZE", "big")]));
        assert!(matches!(result, Err(CoreError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad_url = Config {
            base_url: "not a valid url".to_string(),
            ..Config::default()
        };
        assert!(bad_url.validate().is_err());

        let bad_addr = Config {
            bind_addr: "localhost".to_string(),
            ..Config::default()
        };
        assert!(bad_addr.validate().is_err());

        let zero_chunk = Config {
            chunk_size: 0,
            ..Config::default()
        };
        assert!(zero_chunk.validate().is_err());

        let zero_ttl = Config {
            approval_ttl_secs: 0,
            ..Config::default()
        };
        assert!(matches!(zero_ttl.validate(), Err(CoreError::Config(_))));
    }
}
