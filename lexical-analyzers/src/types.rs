//! Closed, language-agnostic schema shared by every lexical analyzer.

use serde::{Deserialize, Serialize};

/// Closed language enum. Every language-dependent operation dispatches on
/// this instead of a free string (see REDESIGN FLAGS in SPEC_FULL.md §9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageKind {
    Js,
    Ts,
    Py,
    Go,
    Rust,
    Other,
}

impl LanguageKind {
    /// True for brace-delimited languages (function bodies use `{ }`).
    pub fn is_brace_language(self) -> bool {
        !matches!(self, LanguageKind::Py | LanguageKind::Other)
    }

    /// Naming convention expected in this language for readability scoring.
    pub fn naming_convention(self) -> NamingConvention {
        match self {
            LanguageKind::Py => NamingConvention::Snake,
            LanguageKind::Js | LanguageKind::Ts => NamingConvention::Camel,
            LanguageKind::Go | LanguageKind::Rust => NamingConvention::Snake,
            LanguageKind::Other => NamingConvention::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingConvention {
    Snake,
    Camel,
    Unspecified,
}

/// A top-level function definition found in source text.
///
/// `start`/`end` are absolute byte offsets into the original source; `end`
/// is exclusive and includes the closing brace (or the last line of the
/// indented block for Python).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// Names excluded from `extract_function_spans` regardless of language.
pub const NAME_DENYLIST: [&str; 6] = ["if", "for", "while", "describe", "it", "test"];

pub fn is_denied(name: &str, lang: LanguageKind) -> bool {
    if NAME_DENYLIST.contains(&name) {
        return true;
    }
    lang == LanguageKind::Py && name.starts_with('_')
}
