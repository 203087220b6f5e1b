//! Error types for the pattern store.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("config error: {0}")]
    Config(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("no pattern found for {0}")]
    NotFound(String),

    #[error("name already taken: {0}")]
    DuplicateName(String),

    #[error("optimistic concurrency failure: expected version {expected}, store has {actual}")]
    StaleVersion { expected: u32, actual: u32 },

    #[error("no prior version to restore for {0}")]
    NoPriorVersion(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
