//! Error types for the deduplicator.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeduplicatorError {
    #[error("pattern store error: {0}")]
    Store(#[from] pattern_store::StoreError),
}

pub type Result<T> = std::result::Result<T, DeduplicatorError>;
