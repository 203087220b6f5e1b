//! Syntax-validity sub-score (SPEC_FULL.md §4.B).

use crate::security::covenant_check;
use lexical_analyzers::{LanguageKind, count_balance};

pub fn syntax_score(code: &str, language: LanguageKind) -> f64 {
    let mut score = 1.0f64;

    if count_balance(code, language, '{', '}') != 0 {
        score -= 0.3;
    }
    if count_balance(code, language, '[', ']') != 0 {
        score -= 0.15;
    }
    if count_balance(code, language, '(', ')') != 0 {
        score -= 0.15;
    }
    if !covenant_check(code).sealed {
        score -= 0.2;
    }

    score.clamp(0.0, 1.0)
}
