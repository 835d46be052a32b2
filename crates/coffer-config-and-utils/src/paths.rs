//! File system paths for coffer.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

const BLOBS_DIR_NAME: &str = "blobs";
const LOGS_DIR_NAME: &str = "logs";
const LOG_FILE_NAME: &str = "coffer.jsonl";
const CONFIG_FILE_NAME: &str = "config.json";

/// Manages file system paths for the service.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for all runtime files (~/.coffer)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.coffer`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".coffer"),
        })
    }

    /// Create a Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Root of the chunked blob store.
    pub fn blobs_dir(&self) -> PathBuf {
        self.base_dir.join(BLOBS_DIR_NAME)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join(LOGS_DIR_NAME)
    }

    /// JSONL log file written by the observability layer.
    pub fn log_file(&self) -> PathBuf {
        self.logs_dir().join(LOG_FILE_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(&self.base_dir)?;
        std::fs::create_dir_all(self.blobs_dir())?;
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_paths_layout() {
        let paths = Paths::with_base_dir(PathBuf::from("/srv/coffer"));
        assert_eq!(paths.blobs_dir(), PathBuf::from("/srv/coffer/blobs"));
        assert_eq!(
            paths.log_file(),
            PathBuf::from("/srv/coffer/logs/coffer.jsonl")
        );
        assert_eq!(paths.config_file(), PathBuf::from("/srv/coffer/config.json"));
    }

    #[test]
    fn test_ensure_dirs_creates_tree() {
        let dir = tempdir().unwrap();
        let paths = Paths::with_base_dir(dir.path().join("nested"));

        paths.ensure_dirs().unwrap();

        assert!(paths.blobs_dir().is_dir());
        assert!(paths.logs_dir().is_dir());
    }
}
