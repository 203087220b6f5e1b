//! Ranks stored patterns against a query (SPEC_FULL.md §4.D Relevance
//! Engine). Pure in the same sense as the coherency scorer: given a slice of
//! already-loaded patterns, ranking is deterministic and side-effect free —
//! the caller (the dispatcher's `find` handler) is responsible for loading
//! the candidate set from the pattern store first.

mod query;
mod score;

pub use query::RelevanceQuery;
pub use score::{RELEVANCE_FLOOR, relevance_score};

use pattern_store::Pattern;
use serde::Serialize;
use tracing::debug;

pub const DEFAULT_LIMIT: usize = 5;

#[derive(Clone, Debug, Serialize)]
pub struct RankedMatch {
    pub pattern_id: String,
    pub score: f64,
}

/// Scores every pattern against `query`, drops matches below
/// [`RELEVANCE_FLOOR`], and returns the top `limit` ordered by score
/// descending. Ties break on usage success rate, then pattern id, so the
/// ordering is stable across repeated calls (Testable Property 6).
pub fn rank(patterns: &[Pattern], query: &RelevanceQuery, limit: Option<usize>) -> Vec<RankedMatch> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let mut scored: Vec<(f64, &Pattern)> = patterns
        .iter()
        .map(|p| (relevance_score(p, query), p))
        .filter(|(s, _)| *s >= RELEVANCE_FLOOR)
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap()
            .then_with(|| {
                b.usage
                    .success_rate()
                    .partial_cmp(&a.usage.success_rate())
                    .unwrap()
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    debug!(matches = scored.len(), limit, "relevance_engine::rank");
    scored
        .into_iter()
        .take(limit)
        .map(|(score, p)| RankedMatch {
            pattern_id: p.id.clone(),
            score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coherency_scorer::CoherencyRecord;
    use pattern_store::UsageStats;

    fn pattern(id: &str, code: &str, success_rate_applied: u32, success_rate_succeeded: u32) -> Pattern {
        let now = Utc::now();
        Pattern {
            id: id.into(),
            name: id.into(),
            language: "js".into(),
            tags: vec!["sort".into()],
            code: code.into(),
            description: code.into(),
            test_code: None,
            fingerprint: format!("fp-{id}"),
            coherency: CoherencyRecord::new(1.0, 1.0, 1.0, 1.0, 1.0),
            usage: UsageStats {
                times_applied: success_rate_applied,
                times_succeeded: success_rate_succeeded,
            },
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
    fn ranking_respects_limit_and_floor() {
        let patterns = vec![
            pattern("a", "function sortArray(arr) { return arr.sort(); }", 0, 0),
            pattern("b", "function unrelatedThing() { return 1; }", 0, 0),
        ];
        let query = RelevanceQuery {
            text: "sort array".into(),
            language: Some("js".into()),
            tags: vec!["sort".into()],
        };
        let results = rank(&patterns, &query, Some(5));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].pattern_id, "a");
    }

    #[test]
    fn ties_break_on_usage_success_rate_then_id() {
        let mut p1 = pattern("z", "function sortArray(arr) { return arr; }", 10, 10);
        let mut p2 = pattern("a", "function sortArray(arr) { return arr; }", 10, 2);
        p1.tags = vec![];
        p2.tags = vec![];
        let query = RelevanceQuery {
            text: "sort array".into(),
            language: None,
            tags: vec![],
        };
        let results = rank(&[p1, p2], &query, None);
        assert_eq!(results[0].pattern_id, "z");
    }
}
