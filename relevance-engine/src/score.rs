//! Weighted relevance scoring (SPEC_FULL.md §4.D).
//!
//! Combines textual overlap, tag overlap, and language match into a raw
//! score capped at 1.0, then scales by the pattern's coherency composite so
//! a well-matched but low-quality pattern doesn't outrank a slightly
//! weaker-matched but solid one.

use crate::query::RelevanceQuery;
use lexical_analyzers::{jaccard, token_set};
use pattern_store::Pattern;

pub const TEXT_WEIGHT: f64 = 0.5;
pub const TAG_WEIGHT: f64 = 0.3;
pub const LANGUAGE_EXACT: f64 = 0.2;
pub const LANGUAGE_NEUTRAL: f64 = 0.1;
pub const LANGUAGE_MISMATCH: f64 = 0.0;

/// Floor below which a match is not considered relevant at all (SPEC_FULL.md
/// §4.D "Relevance floor").
pub const RELEVANCE_FLOOR: f64 = 0.1;

pub fn relevance_score(pattern: &Pattern, query: &RelevanceQuery) -> f64 {
    let textual = textual_score(pattern, query);
    let tags = tag_score(pattern, query);
    let language = language_score(pattern, query);
    let raw = (textual + tags + language).min(1.0);
    raw * pattern.coherency.composite
}

fn textual_score(pattern: &Pattern, query: &RelevanceQuery) -> f64 {
    if query.text.trim().is_empty() {
        return 0.0;
    }
    let query_tokens = token_set(&query.text);
    let mut pattern_text = pattern.name.clone();
    pattern_text.push(' ');
    pattern_text.push_str(&pattern.description);
    let pattern_tokens = token_set(&pattern_text);
    jaccard(&query_tokens, &pattern_tokens) * TEXT_WEIGHT
}

fn tag_score(pattern: &Pattern, query: &RelevanceQuery) -> f64 {
    if query.tags.is_empty() {
        return 0.0;
    }
    let matched = query.tags.iter().filter(|t| pattern.tags.contains(t)).count();
    (matched as f64 / query.tags.len() as f64) * TAG_WEIGHT
}

fn language_score(pattern: &Pattern, query: &RelevanceQuery) -> f64 {
    match &query.language {
        None => LANGUAGE_NEUTRAL,
        Some(lang) if lang.eq_ignore_ascii_case(&pattern.language) => LANGUAGE_EXACT,
        Some(_) => LANGUAGE_MISMATCH,
    }
}
