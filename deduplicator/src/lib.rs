//! Duplicate and near-duplicate detection ahead of candidate submission
//! (SPEC_FULL.md §4.H). Exact duplicates are caught by fingerprint lookup;
//! near-duplicates by a bounded, recency-ordered token-Jaccard sample. This
//! crate never writes to the store — callers decide what to do with a
//! [`DuplicateCheck`].

pub mod errors;
mod fingerprint;
mod near_duplicate;

pub use errors::{DeduplicatorError, Result};
pub use fingerprint::fingerprint;
pub use near_duplicate::{
    DEFAULT_SAMPLE_SIZE, DEFAULT_SIMILARITY_THRESHOLD, closest_match, parse_language,
};

use pattern_store::{Pattern, PatternStore};
use tracing::info;

#[derive(Debug, Clone)]
pub enum DuplicateCheck {
    /// An exact fingerprint match already exists in the store.
    Duplicate(Pattern),
    /// No exact match, but a near-duplicate was found above threshold.
    NearDuplicate(Pattern, f64),
    /// Neither; the candidate is genuinely new.
    Unique,
}

#[derive(Debug, Clone)]
pub struct DeduplicationConfig {
    pub sample_size: usize,
    pub similarity_threshold: f64,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

/// Checks `code` against `store`: exact fingerprint lookup first, then a
/// bounded near-duplicate scan over the most recently updated patterns.
pub fn check(
    store: &PatternStore,
    code: &str,
    language: &str,
    cfg: &DeduplicationConfig,
) -> Result<DuplicateCheck> {
    let lang = parse_language(language);
    let fp = fingerprint(code, lang);

    if let Some(existing) = store.get_by_fingerprint(&fp)? {
        info!(fingerprint = %fp, "deduplicator::check exact duplicate");
        return Ok(DuplicateCheck::Duplicate(existing));
    }

    let sample = store.recent(cfg.sample_size)?;
    if let Some((matched, sim)) = closest_match(code, &sample, cfg.similarity_threshold) {
        info!(pattern_id = %matched.id, similarity = sim, "deduplicator::check near duplicate");
        return Ok(DuplicateCheck::NearDuplicate(matched.clone(), sim));
    }

    Ok(DuplicateCheck::Unique)
}
