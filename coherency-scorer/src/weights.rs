//! Composite weights. Process-wide constants, never per-pattern
//! configuration (SPEC_FULL.md §4.B / Open Question 1).

pub const WEIGHT_SYNTAX: f64 = 0.25;
pub const WEIGHT_READABILITY: f64 = 0.20;
pub const WEIGHT_SECURITY: f64 = 0.15;
pub const WEIGHT_TEST_PROOF: f64 = 0.30;
pub const WEIGHT_RELIABILITY: f64 = 0.10;

/// Tolerance for the `composite == Σ wᵢ·sᵢ` invariant (float round-off).
pub const COMPOSITE_TOLERANCE: f64 = 1e-3;
