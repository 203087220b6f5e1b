//! Error types for the harvester.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("root does not exist: {0}")]
    MissingRoot(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("git clone failed: {0}")]
    Clone(String),

    #[error("lexical analysis error: {0}")]
    Lexical(#[from] lexical_analyzers::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
