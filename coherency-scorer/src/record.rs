//! The five sub-scores plus the composite (SPEC_FULL.md §3 CoherencyRecord).

use crate::weights::{
    WEIGHT_READABILITY, WEIGHT_RELIABILITY, WEIGHT_SECURITY, WEIGHT_SYNTAX, WEIGHT_TEST_PROOF,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoherencyRecord {
    pub syntax: f64,
    pub readability: f64,
    pub security: f64,
    pub test_proof: f64,
    pub reliability: f64,
    pub composite: f64,
}

impl CoherencyRecord {
    /// Build a record, computing `composite` from the sub-scores so the
    /// invariant `composite == Σ wᵢ·sᵢ` holds by construction — recomposed
    /// deterministically, never recomputed elsewhere or cached stale
    /// (Testable Property 2).
    pub fn new(syntax: f64, readability: f64, security: f64, test_proof: f64, reliability: f64) -> Self {
        let syntax = syntax.clamp(0.0, 1.0);
        let readability = readability.clamp(0.0, 1.0);
        let security = security.clamp(0.0, 1.0);
        let test_proof = test_proof.clamp(0.0, 1.0);
        let reliability = reliability.clamp(0.0, 1.0);
        let composite = WEIGHT_SYNTAX * syntax
            + WEIGHT_READABILITY * readability
            + WEIGHT_SECURITY * security
            + WEIGHT_TEST_PROOF * test_proof
            + WEIGHT_RELIABILITY * reliability;
        Self {
            syntax,
            readability,
            security,
            test_proof,
            reliability,
            composite,
        }
    }

    /// Recompute the weighted sum from the stored sub-scores, for callers
    /// that want to verify a record loaded from storage was not corrupted.
    pub fn recomposed(&self) -> f64 {
        WEIGHT_SYNTAX * self.syntax
            + WEIGHT_READABILITY * self.readability
            + WEIGHT_SECURITY * self.security
            + WEIGHT_TEST_PROOF * self.test_proof
            + WEIGHT_RELIABILITY * self.reliability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::COMPOSITE_TOLERANCE;

    #[test]
    fn composite_matches_weighted_sum() {
        let r = CoherencyRecord::new(0.9, 0.8, 1.0, 0.7, 0.7);
        assert!((r.composite - r.recomposed()).abs() < COMPOSITE_TOLERANCE);
    }

    #[test]
    fn sub_scores_are_clamped() {
        let r = CoherencyRecord::new(1.5, -0.5, 0.5, 0.5, 0.5);
        assert_eq!(r.syntax, 1.0);
        assert_eq!(r.readability, 0.0);
    }
}
