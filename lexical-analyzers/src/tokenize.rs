//! The single consolidated tokenizer used by the Relevance Engine and the
//! Deduplicator (SPEC_FULL.md Open Question 3 — the source used two).

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").unwrap());

static STOPWORDS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "of", "to", "in", "on", "for", "and", "or", "is", "are", "that", "this",
        "with", "it", "as", "by", "be", "at", "from", "into", "using", "use",
    ]
    .into_iter()
    .collect()
});

/// Lowercase, split on non-alphanumeric runs, drop stopwords. Used for both
/// relevance scoring (description text) and token-Jaccard (source code).
pub fn token_set(text: &str) -> BTreeSet<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_ascii_lowercase())
        .filter(|w| !w.is_empty() && !STOPWORDS.contains(w.as_str()))
        .collect()
}

/// `|a ∩ b| / |a ∪ b|`, defined as `0.0` when both sets are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count() as f64;
    let union = a.union(b).count() as f64;
    if union == 0.0 { 0.0 } else { inter / union }
}
