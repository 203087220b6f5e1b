//! Engine-wide configuration, built from environment variables in the
//! style of `rag-store::RagConfig::from_env` (SPEC_FULL.md §2 ambient
//! stack). Weights, thresholds, and the license table stay `const`/`static`
//! data in their owning crates — this struct only carries what genuinely
//! varies per deployment: where the three tiers live on disk.

use crate::errors::EngineError;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub data_dir: PathBuf,
    pub debug: bool,
}

impl EngineConfig {
    /// Recognized vars:
    /// - `PATTERN_ENGINE_DATA_DIR` (default: `./.pattern-engine`)
    /// - `PATTERN_ENGINE_DEBUG` = true/false (default: false)
    pub fn from_env() -> Result<Self, EngineError> {
        use std::env;
        let data_dir = env::var("PATTERN_ENGINE_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.pattern-engine"));
        let debug = env::var("PATTERN_ENGINE_DEBUG")
            .ok()
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        Ok(Self { data_dir, debug })
    }

    pub fn local_db_path(&self) -> PathBuf {
        self.data_dir.join("local.db")
    }

    pub fn personal_db_path(&self) -> PathBuf {
        self.data_dir.join("personal.db")
    }

    pub fn community_db_path(&self) -> PathBuf {
        self.data_dir.join("community.db")
    }

    pub fn candidates_db_path(&self) -> PathBuf {
        self.data_dir.join("candidates.db")
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(EngineError::Config("empty PATTERN_ENGINE_DATA_DIR".into()));
        }
        Ok(())
    }
}
