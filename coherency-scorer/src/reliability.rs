//! Reliability sub-score, derived from run history (SPEC_FULL.md §4.B).

/// Aggregate signal computed from a pattern's `RunRecord` history.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReliabilityHistory {
    pub total_runs: u32,
    pub healed_runs: u32,
    /// True if any of the most recent 5 runs needed healing.
    pub healed_in_last_five: bool,
}

/// Penalty factor `k` applied to the healed-run ratio.
const HEAL_PENALTY_K: f64 = 1.0;
const RECENT_HEAL_PENALTY: f64 = 0.1;
const NEUTRAL_PRIOR: f64 = 0.7;

pub fn reliability_score(history: Option<&ReliabilityHistory>) -> f64 {
    let Some(h) = history else {
        return NEUTRAL_PRIOR;
    };
    if h.total_runs == 0 {
        return NEUTRAL_PRIOR;
    }
    let ratio = h.healed_runs as f64 / h.total_runs as f64;
    let mut score = 1.0 - HEAL_PENALTY_K * ratio;
    if h.healed_in_last_five {
        score -= RECENT_HEAL_PENALTY;
    }
    score.clamp(0.0, 1.0)
}
