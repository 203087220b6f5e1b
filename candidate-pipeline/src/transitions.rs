//! Pure state-transition logic, independent of storage (SPEC_FULL.md
//! §4.F). Kept separate from [`crate::store::CandidateStore`] the same way
//! `coherency-scorer` keeps scoring pure and filesystem access out.

use crate::record::{CandidateState, CandidateRecord, GenerationMethod, TestStatus};
use crate::thresholds::{MAX_PROMOTE_ATTEMPTS, PROMOTE_FLOOR, RETIRE_MIN_RUNS, RETIRE_SUCCESS_FLOOR, SUBMIT_FLOOR};
use chrono::Utc;
use coherency_scorer::CoherencyRecord;
use verifier_api::VerifyResult;

/// Decides the initial state for a freshly-scored fragment arriving via
/// harvest/generate/submit.
pub fn submit(
    id: String,
    code: String,
    language: String,
    description: String,
    tags: Vec<String>,
    fingerprint: String,
    coherency: CoherencyRecord,
    covenant_sealed: bool,
    generation_method: GenerationMethod,
) -> CandidateRecord {
    let now = Utc::now();
    let state = if !covenant_sealed || coherency.composite < SUBMIT_FLOOR {
        CandidateState::Rejected
    } else {
        CandidateState::Candidate
    };
    CandidateRecord {
        id,
        state,
        generation_method,
        test_status: TestStatus::Pending,
        code,
        language,
        description,
        tags,
        fingerprint,
        coherency,
        attempt_count: 0,
        pattern_id: None,
        created_at: now,
        updated_at: now,
    }
}

/// Applies one verifier verdict to a `Candidate` record. Returns an error
/// if the record isn't in a state that accepts verdicts.
pub fn apply_verdict(
    record: &mut CandidateRecord,
    verdict: &VerifyResult,
    post_test_coherency: CoherencyRecord,
) -> Result<(), crate::errors::PipelineError> {
    if record.state != CandidateState::Candidate {
        return Err(crate::errors::PipelineError::Terminal(record.id.clone()));
    }

    record.coherency = post_test_coherency;
    if verdict.passed && post_test_coherency.composite >= PROMOTE_FLOOR {
        record.test_status = TestStatus::Passed;
        record.state = CandidateState::Proven;
    } else {
        record.test_status = TestStatus::Failed;
        record.attempt_count += 1;
        if record.attempt_count >= MAX_PROMOTE_ATTEMPTS {
            record.state = CandidateState::Exhausted;
        }
    }
    record.updated_at = Utc::now();
    Ok(())
}

/// A `Proven` pattern with repeated bug reports is retired.
pub fn maybe_retire(record: &mut CandidateRecord, times_applied: u32, success_rate: f64) -> bool {
    if record.state == CandidateState::Proven && times_applied >= RETIRE_MIN_RUNS && success_rate < RETIRE_SUCCESS_FLOOR {
        record.state = CandidateState::Retired;
        record.updated_at = Utc::now();
        true
    } else {
        false
    }
}

/// A rollback is "verified" when the restored version's rescored composite
/// is no worse than the version it replaced.
pub fn rollback_is_verified(new_composite: f64, prior_composite: f64) -> bool {
    new_composite >= prior_composite
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_state(state: CandidateState) -> CandidateRecord {
        let now = Utc::now();
        CandidateRecord {
            id: "c1".into(),
            state,
            generation_method: GenerationMethod::Variant,
            test_status: TestStatus::Pending,
            code: "function f() {}".into(),
            language: "js".into(),
            description: String::new(),
            tags: Vec::new(),
            fingerprint: "fp".into(),
            coherency: CoherencyRecord::new(0.8, 0.8, 0.8, 0.0, 0.7),
            attempt_count: 0,
            pattern_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn low_coherency_submission_is_rejected() {
        let r = submit(
            "c1".into(),
            "function f() {}".into(),
            "js".into(),
            String::new(),
            Vec::new(),
            "fp".into(),
            CoherencyRecord::new(0.2, 0.2, 0.2, 0.0, 0.2),
            true,
            GenerationMethod::Variant,
        );
        assert_eq!(r.state, CandidateState::Rejected);
    }

    #[test]
    fn covenant_failure_rejects_regardless_of_coherency() {
        let r = submit(
            "c1".into(),
            "eval(x)".into(),
            "js".into(),
            String::new(),
            Vec::new(),
            "fp".into(),
            CoherencyRecord::new(0.95, 0.95, 0.95, 0.95, 0.95),
            false,
            GenerationMethod::Variant,
        );
        assert_eq!(r.state, CandidateState::Rejected);
    }

    #[test]
    fn passing_verdict_with_sufficient_coherency_promotes() {
        let mut r = record_with_state(CandidateState::Candidate);
        let verdict = VerifyResult {
            passed: true,
            output: "ok".into(),
            duration_ms: 10,
        };
        apply_verdict(&mut r, &verdict, CoherencyRecord::new(0.9, 0.9, 0.9, 0.9, 0.9)).unwrap();
        assert_eq!(r.state, CandidateState::Proven);
        assert_eq!(r.test_status, TestStatus::Passed);
    }

    #[test]
    fn repeated_failures_exhaust_the_candidate() {
        let mut r = record_with_state(CandidateState::Candidate);
        let verdict = VerifyResult {
            passed: false,
            output: "fail".into(),
            duration_ms: 10,
        };
        for _ in 0..MAX_PROMOTE_ATTEMPTS {
            apply_verdict(&mut r, &verdict, CoherencyRecord::new(0.6, 0.6, 0.6, 0.3, 0.6)).unwrap();
        }
        assert_eq!(r.state, CandidateState::Exhausted);
        assert_eq!(r.attempt_count, MAX_PROMOTE_ATTEMPTS);
    }

    #[test]
    fn verdict_on_terminal_state_is_rejected() {
        let mut r = record_with_state(CandidateState::Rejected);
        let verdict = VerifyResult {
            passed: true,
            output: "ok".into(),
            duration_ms: 10,
        };
        assert!(apply_verdict(&mut r, &verdict, CoherencyRecord::new(0.9, 0.9, 0.9, 0.9, 0.9)).is_err());
    }

    #[test]
    fn repeated_bugs_retire_a_proven_pattern() {
        let mut r = record_with_state(CandidateState::Proven);
        assert!(maybe_retire(&mut r, 5, 0.2));
        assert_eq!(r.state, CandidateState::Retired);
    }

    #[test]
    fn few_runs_do_not_retire_even_with_low_success() {
        let mut r = record_with_state(CandidateState::Proven);
        assert!(!maybe_retire(&mut r, 2, 0.0));
        assert_eq!(r.state, CandidateState::Proven);
    }
}
