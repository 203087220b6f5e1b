//! Candidate lifecycle and auto-promote sweep (SPEC_FULL.md §4.F).

mod errors;
mod record;
mod store;
mod thresholds;
mod transitions;

pub use errors::{PipelineError, Result};
pub use record::{CandidateRecord, CandidateState, GenerationMethod, TestStatus};
pub use store::CandidateStore;
pub use thresholds::*;
pub use transitions::{apply_verdict, maybe_retire, rollback_is_verified, submit};

use chrono::Utc;
use pattern_store::{Pattern, PatternStore, UsageStats};
use std::time::Duration;
use tracing::{info, warn};
use verifier_api::{VerifyRequest, Verifier};

#[derive(Debug, Default, serde::Serialize)]
pub struct PromoteSummary {
    pub attempted: usize,
    pub promoted: usize,
    pub failed: usize,
    pub exhausted: usize,
}

/// Scans `Candidate` records with `testStatus` in {synthesized, pending},
/// invokes the verifier for each, and transitions it. Bounded by
/// `max_per_run` to avoid unbounded work in one sweep. Candidates that are
/// promoted are written into `pattern_store` as new patterns.
pub async fn auto_promote(
    candidates: &CandidateStore,
    patterns: &PatternStore,
    verifier: &dyn Verifier,
    max_per_run: usize,
) -> Result<PromoteSummary> {
    let promotable = candidates.list_promotable(max_per_run)?;
    let mut summary = PromoteSummary::default();

    for mut candidate in promotable {
        summary.attempted += 1;
        let request = VerifyRequest {
            code: candidate.code.clone(),
            test_code: String::new(),
            language: candidate.language.clone(),
        };
        let timeout = Duration::from_secs(thresholds::VERIFIER_TIMEOUT_SECS);

        match verifier.verify(&request, timeout).await {
            Ok(verdict) => {
                let post_test_coherency = candidate.coherency;
                apply_verdict(&mut candidate, &verdict, post_test_coherency)?;
                match candidate.state {
                    CandidateState::Proven => {
                        let pattern_id = promote_into_store(patterns, &candidate)?;
                        candidate.pattern_id = Some(pattern_id);
                        summary.promoted += 1;
                    }
                    CandidateState::Exhausted => summary.exhausted += 1,
                    _ => summary.failed += 1,
                }
            }
            Err(err) => {
                warn!(id = %candidate.id, error = %err, "auto_promote: verifier call failed, left in current state");
                summary.failed += 1;
            }
        }
        candidates.save(&candidate)?;
    }

    info!(?summary, "candidate_pipeline::auto_promote complete");
    Ok(summary)
}

fn promote_into_store(patterns: &PatternStore, candidate: &CandidateRecord) -> Result<String> {
    let now = Utc::now();
    let pattern = Pattern {
        id: candidate.id.clone(),
        name: candidate.id.clone(),
        language: candidate.language.clone(),
        tags: candidate.tags.clone(),
        code: candidate.code.clone(),
        description: candidate.description.clone(),
        test_code: None,
        fingerprint: candidate.fingerprint.clone(),
        coherency: candidate.coherency,
        usage: UsageStats::default(),
        bugs: Vec::new(),
        provenance: None,
        lineage_parent: None,
        version: 0,
        retired: false,
        created_at: now,
        updated_at: now,
    };
    patterns.put(&pattern)?;
    Ok(pattern.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coherency_scorer::CoherencyRecord;
    use std::future::Future;
    use std::pin::Pin;
    use verifier_api::{VerifierError, VerifyResult};

    struct AlwaysPasses;
    impl Verifier for AlwaysPasses {
        fn verify<'a>(
            &'a self,
            _request: &'a VerifyRequest,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = std::result::Result<VerifyResult, VerifierError>> + Send + 'a>> {
            Box::pin(async {
                Ok(VerifyResult {
                    passed: true,
                    output: "ok".into(),
                    duration_ms: 5,
                })
            })
        }
    }

    struct AlwaysFails;
    impl Verifier for AlwaysFails {
        fn verify<'a>(
            &'a self,
            _request: &'a VerifyRequest,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = std::result::Result<VerifyResult, VerifierError>> + Send + 'a>> {
            Box::pin(async {
                Ok(VerifyResult {
                    passed: false,
                    output: "fail".into(),
                    duration_ms: 5,
                })
            })
        }
    }

    fn candidate(id: &str) -> CandidateRecord {
        submit(
            id.into(),
            "function f() {}".into(),
            "js".into(),
            String::new(),
            Vec::new(),
            format!("fp-{id}"),
            CoherencyRecord::new(0.9, 0.9, 0.9, 0.9, 0.9),
            true,
            GenerationMethod::Variant,
        )
    }

    #[tokio::test]
    async fn auto_promote_moves_passing_candidate_into_pattern_store() {
        let candidates = CandidateStore::open_in_memory().unwrap();
        let patterns = PatternStore::open_in_memory().unwrap();
        candidates.put_if_new(&candidate("c1")).unwrap();

        let summary = auto_promote(&candidates, &patterns, &AlwaysPasses, MAX_PER_RUN).await.unwrap();
        assert_eq!(summary.promoted, 1);
        let stored = candidates.get("c1").unwrap();
        assert_eq!(stored.state, CandidateState::Proven);
        assert!(patterns.get("c1").is_ok());
    }

    #[tokio::test]
    async fn repeated_failures_exhaust_after_max_attempts() {
        let candidates = CandidateStore::open_in_memory().unwrap();
        let patterns = PatternStore::open_in_memory().unwrap();
        candidates.put_if_new(&candidate("c1")).unwrap();

        for _ in 0..MAX_PROMOTE_ATTEMPTS {
            auto_promote(&candidates, &patterns, &AlwaysFails, MAX_PER_RUN).await.unwrap();
        }
        let stored = candidates.get("c1").unwrap();
        assert_eq!(stored.state, CandidateState::Exhausted);
    }

    #[test]
    fn duplicate_fingerprint_submission_is_not_reattempted() {
        let candidates = CandidateStore::open_in_memory().unwrap();
        let first = candidates.put_if_new(&candidate("c1")).unwrap();
        assert!(first);

        let mut dup = candidate("c2");
        dup.fingerprint = "fp-c1".to_string();
        let second = candidates.put_if_new(&dup).unwrap();
        assert!(!second);
    }
}
