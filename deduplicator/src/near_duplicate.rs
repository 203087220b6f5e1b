//! Bounded near-duplicate detection over a recency-ordered sample
//! (SPEC_FULL.md §4.H).

use lexical_analyzers::{LanguageKind, jaccard, token_set};
use pattern_store::Pattern;

/// Default size of the recency-ordered sample drawn from the store.
pub const DEFAULT_SAMPLE_SIZE: usize = 100;

/// Similarity at or above which two fragments are considered near-duplicates.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

pub fn parse_language(language: &str) -> LanguageKind {
    match language {
        "js" => LanguageKind::Js,
        "ts" => LanguageKind::Ts,
        "py" => LanguageKind::Py,
        "go" => LanguageKind::Go,
        "rust" => LanguageKind::Rust,
        _ => LanguageKind::Other,
    }
}

/// Finds the closest match to `code` among `sample`, if any clears
/// `threshold`. Ties break on the earliest sample entry (stable, since
/// callers pass a recency-ordered sample).
pub fn closest_match<'a>(
    code: &str,
    sample: &'a [Pattern],
    threshold: f64,
) -> Option<(&'a Pattern, f64)> {
    let candidate_tokens = token_set(code);
    let mut best: Option<(&Pattern, f64)> = None;
    for pattern in sample {
        let sim = jaccard(&candidate_tokens, &token_set(&pattern.code));
        if sim < threshold {
            continue;
        }
        match &best {
            Some((_, best_sim)) if *best_sim >= sim => {}
            _ => best = Some((pattern, sim)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coherency_scorer::CoherencyRecord;
    use pattern_store::UsageStats;

    fn sample_pattern(id: &str, code: &str) -> Pattern {
        let now = Utc::now();
        Pattern {
            id: id.to_string(),
            name: id.to_string(),
            language: "js".to_string(),
            tags: Vec::new(),
            code: code.to_string(),
            description: "sample pattern".to_string(),
            test_code: None,
            fingerprint: format!("fp-{id}"),
            coherency: CoherencyRecord::new(1.0, 1.0, 1.0, 1.0, 1.0),
            usage: UsageStats::default(),
            bugs: Vec::new(),
            provenance: None,
            lineage_parent: None,
            version: 0,
            retired: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn finds_near_duplicate_above_threshold() {
        let sample = vec![sample_pattern(
            "p1",
            "function add(a, b) { return a + b; }",
        )];
        let found = closest_match(
            "function add(a, b) {\n    return a + b;\n}",
            &sample,
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert!(found.is_some());
    }

    #[test]
    fn unrelated_code_is_not_a_near_duplicate() {
        let sample = vec![sample_pattern(
            "p1",
            "function add(a, b) { return a + b; }",
        )];
        let found = closest_match(
            "class Widget extends Component { render() { return null; } }",
            &sample,
            DEFAULT_SIMILARITY_THRESHOLD,
        );
        assert!(found.is_none());
    }

    #[test]
    fn parse_language_maps_known_codes() {
        assert_eq!(parse_language("rust"), LanguageKind::Rust);
        assert_eq!(parse_language("weird"), LanguageKind::Other);
    }
}
