//! Crate-wide error type for lexical analysis.

use thiserror::Error;

/// Errors raised while extracting function spans or scanning source text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A brace/bracket/paren sequence never closed before end of input.
    #[error("malformed span: unclosed delimiter starting at byte offset {0}")]
    MalformedSpan(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
