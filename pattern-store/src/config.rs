//! Store configuration.

use crate::errors::{Result, StoreError};
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Path to the sqlite database file. `:memory:` is accepted for tests.
    pub db_path: PathBuf,
    /// Number of prior revisions retained per pattern (SPEC_FULL.md §3,
    /// version history ring).
    pub version_history_depth: u32,
}

impl StoreConfig {
    /// Builds configuration from environment variables.
    ///
    /// Recognized vars:
    /// - `PATTERN_DB_PATH` (default: `patterns.db`)
    /// - `PATTERN_VERSION_HISTORY_DEPTH` (default: 10)
    pub fn from_env() -> Result<Self> {
        let db_path = std::env::var("PATTERN_DB_PATH")
            .unwrap_or_else(|_| "patterns.db".to_string())
            .into();
        let version_history_depth = std::env::var("PATTERN_VERSION_HISTORY_DEPTH")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);
        let cfg = Self {
            db_path,
            version_history_depth,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version_history_depth == 0 {
            return Err(StoreError::Config(
                "version_history_depth must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: "patterns.db".into(),
            version_history_depth: 10,
        }
    }
}
