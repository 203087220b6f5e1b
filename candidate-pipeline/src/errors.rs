//! Error types for the candidate pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no candidate found for {0}")]
    NotFound(String),

    #[error("pattern store error: {0}")]
    Store(#[from] pattern_store::StoreError),

    #[error("candidate {0} is in a terminal state and cannot be transitioned")]
    Terminal(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
