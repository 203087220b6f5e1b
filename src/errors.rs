//! Root-crate error surface (SPEC_FULL.md §7). Wraps store/dispatcher
//! startup failures and environment misconfiguration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("pattern store error: {0}")]
    Store(#[from] pattern_store::StoreError),
    #[error("candidate store error: {0}")]
    Pipeline(#[from] candidate_pipeline::PipelineError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
