//! Error types for federation operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FederationError {
    #[error("pattern store error: {0}")]
    Store(#[from] pattern_store::StoreError),
}

pub type Result<T> = std::result::Result<T, FederationError>;
