//! Pattern Engine root crate: environment wiring for the three pattern-store
//! tiers and the candidate store. The JSON-RPC stdio loop and external
//! verifier/test-runner that would sit in front of [`dispatcher::Dispatcher`]
//! are explicitly out of scope (SPEC_FULL.md §1 Non-goals) — this crate
//! stops at standing the stores up and handing back a ready [`Engine`].

pub mod config;
pub mod errors;

pub use config::EngineConfig;
pub use errors::{EngineError, Result};

use candidate_pipeline::CandidateStore;
use pattern_store::{PatternStore, StoreConfig};
use tracing::info;

/// The three replicated tiers plus the candidate store, opened against one
/// [`EngineConfig`]. Construction is the engine's only public entry point —
/// there is no long-running loop here, per Non-goals.
pub struct Engine {
    pub local: PatternStore,
    pub personal: PatternStore,
    pub community: PatternStore,
    pub candidates: CandidateStore,
}

impl Engine {
    pub fn open(cfg: &EngineConfig) -> Result<Self> {
        cfg.validate()?;
        std::fs::create_dir_all(&cfg.data_dir)?;

        let local = PatternStore::open(&StoreConfig {
            db_path: cfg.local_db_path(),
            version_history_depth: 10,
        })?;
        let personal = PatternStore::open(&StoreConfig {
            db_path: cfg.personal_db_path(),
            version_history_depth: 10,
        })?;
        let community = PatternStore::open(&StoreConfig {
            db_path: cfg.community_db_path(),
            version_history_depth: 10,
        })?;
        let candidates = CandidateStore::open(&cfg.candidates_db_path())?;

        info!(data_dir = %cfg.data_dir.display(), "Engine::open complete");
        Ok(Self {
            local,
            personal,
            community,
            candidates,
        })
    }

    /// Builds a [`dispatcher::Dispatcher`] borrowing this engine's stores.
    /// The caller supplies the verifier and git-clone collaborators, since no
    /// concrete implementation of either ships with this crate (SPEC_FULL.md
    /// §6).
    pub fn dispatcher<'a>(
        &'a self,
        verifier: &'a dyn verifier_api::Verifier,
        git_clone: &'a dyn harvester::GitClone,
    ) -> dispatcher::Dispatcher<'a> {
        dispatcher::Dispatcher {
            local: &self.local,
            personal: &self.personal,
            community: &self.community,
            candidates: &self.candidates,
            verifier,
            git_clone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_opens_against_a_temp_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = EngineConfig {
            data_dir: dir.path().to_path_buf(),
            debug: false,
        };
        let engine = Engine::open(&cfg).unwrap();
        assert!(engine.local.iter(&Default::default()).unwrap().is_empty());
    }
}
