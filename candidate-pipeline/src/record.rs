//! Candidate state machine types (SPEC_FULL.md §4.F).

use chrono::{DateTime, Utc};
use coherency_scorer::CoherencyRecord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CandidateState {
    Submitted,
    Candidate,
    Proven,
    Exhausted,
    Retired,
    Rejected,
}

impl CandidateState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            CandidateState::Exhausted | CandidateState::Retired | CandidateState::Rejected
        )
    }
}

/// How this candidate's code came to exist. Naming kept consistent with
/// `iterative-refine` throughout, never the earlier `serf-refine` spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationMethod {
    Variant,
    IterativeRefine,
    ApproachSwap,
    Harvest,
    DebugVariant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    Absent,
    Synthesized,
    Pending,
    Passed,
    Failed,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub state: CandidateState,
    pub generation_method: GenerationMethod,
    pub test_status: TestStatus,
    pub code: String,
    pub language: String,
    pub description: String,
    pub tags: Vec<String>,
    pub fingerprint: String,
    pub coherency: CoherencyRecord,
    /// Failed heal+promote attempts while in `Candidate`; bounded by `K`
    /// (default 3) before the candidate is exhausted.
    pub attempt_count: u32,
    /// Set once the candidate has been written into the Pattern Store.
    pub pattern_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
