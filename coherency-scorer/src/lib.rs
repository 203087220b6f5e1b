//! Deterministic multi-dimensional quality evaluator (SPEC_FULL.md §4.B).
//!
//! `score()` is pure: identical inputs always produce an identical
//! [`record::CoherencyRecord`] (Testable Property 1). It performs no
//! filesystem or clock access; resolving a companion test file from disk is
//! the caller's job (see [`test_proof::companion_test_candidates`]).

pub mod readability;
pub mod record;
pub mod reliability;
pub mod security;
pub mod syntax;
pub mod test_proof;
pub mod weights;

pub use record::CoherencyRecord;
pub use reliability::ReliabilityHistory;
pub use security::{CovenantResult, covenant_check};

use lexical_analyzers::LanguageKind;

/// Everything the scorer needs to produce a [`CoherencyRecord`] for one
/// code fragment. No field here is a filesystem path — all content is
/// already resolved by the caller.
pub struct ScoreInput<'a> {
    pub code: &'a str,
    pub language: LanguageKind,
    /// Content of the companion test file, if one was found.
    pub test_code: Option<&'a str>,
    /// Symbol/file-stem the test is expected to textually reference.
    pub test_reference: &'a str,
    pub reliability_history: Option<&'a ReliabilityHistory>,
}

pub fn score(input: &ScoreInput<'_>) -> CoherencyRecord {
    let syntax = syntax::syntax_score(input.code, input.language);
    let readability = readability::readability_score(input.code, input.language);
    let security = security::security_score(input.code);
    let test_proof = test_proof::test_proof_score(input.test_code, input.test_reference);
    let reliability = reliability::reliability_score(input.reliability_history);
    CoherencyRecord::new(syntax, readability, security, test_proof, reliability)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoring_is_deterministic() {
        let input = ScoreInput {
            code: "function add(a, b) { return a + b; }",
            language: LanguageKind::Js,
            test_code: Some("assert.equal(add(2,3), 5)"),
            test_reference: "add",
            reliability_history: None,
        };
        let a = score(&input);
        let b = score(&input);
        assert!((a.composite - b.composite).abs() < 1e-9);
    }

    #[test]
    fn covenant_failing_code_has_low_composite() {
        let input = ScoreInput {
            code: "const k='sk_live_' + 'a'.repeat(40)",
            language: LanguageKind::Js,
            test_code: None,
            test_reference: "",
            reliability_history: None,
        };
        let r = score(&input);
        assert!(r.composite < 0.5);
    }
}
