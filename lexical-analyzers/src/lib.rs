//! Per-language regex-level extractors: function spans, comment/string
//! stripping, and brace balance — see SPEC_FULL.md §4.A.
//!
//! Deliberately not a parser: every operation here is a character scanner or
//! regex match over raw text. No grammar, no AST.

pub mod errors;
mod noise;
mod spans;
mod tokenize;
pub mod types;

pub use errors::{Error, Result};
pub use noise::{count_balance, elide, strip_noise};
pub use spans::extract_function_spans;
pub use tokenize::{jaccard, token_set};
pub use types::{FunctionSpan, LanguageKind, NamingConvention, is_denied};
