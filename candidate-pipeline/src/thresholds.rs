//! Fixed thresholds governing state transitions (SPEC_FULL.md §4.F).

/// Minimum composite to leave `Submitted` for `Candidate` rather than being
/// rejected outright.
pub const SUBMIT_FLOOR: f64 = 0.5;

/// Minimum post-test composite to leave `Candidate` for `Proven`.
pub const PROMOTE_FLOOR: f64 = 0.7;

/// Failed heal+promote attempts allowed before a `Candidate` becomes
/// `Exhausted`.
pub const MAX_PROMOTE_ATTEMPTS: u32 = 3;

/// Auto-promote sweep bound, to avoid unbounded work in one run.
pub const MAX_PER_RUN: usize = 20;

/// Below this usage success rate (with at least `RETIRE_MIN_RUNS` samples),
/// a `Proven` pattern is retired.
pub const RETIRE_SUCCESS_FLOOR: f64 = 0.3;
pub const RETIRE_MIN_RUNS: u32 = 5;

/// Per-call verifier timeout (SPEC_FULL.md §5).
pub const VERIFIER_TIMEOUT_SECS: u64 = 60;
