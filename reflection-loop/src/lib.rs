//! Bounded fixed-point refiner (SPEC_FULL.md §4.E Reflection Loop).
//!
//! `refine` is guaranteed to halt: the loop budget `L` bounds the iteration
//! count, and the loop breaks as soon as a round fails to strictly improve
//! the composite. The best composite returned is always >= the initial one
//! (Testable Property: reflection non-regression, spec.md §8.6).

mod transforms;

pub use transforms::{correct, heal, propose_variants, readable, secure, simplify, unify};

use coherency_scorer::{CoherencyRecord, ScoreInput};
use lexical_analyzers::LanguageKind;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct ReflectionConfig {
    /// Target composite at or above which the loop stops early.
    pub target_composite: f64,
    /// Maximum number of loop iterations (`L` in spec.md §4.E).
    pub loop_budget: u32,
    /// Wall-clock ceiling for the whole refine call.
    pub loop_time_budget: Duration,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            target_composite: 0.9,
            loop_budget: 3,
            loop_time_budget: Duration::from_secs(2),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct HistoryEntry {
    pub loop_index: u32,
    pub transform: String,
    pub composite: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct RefineResult {
    pub code: String,
    pub record: CoherencyRecord,
    pub history: Vec<HistoryEntry>,
    /// True only when the loop stopped because `loop_time_budget` elapsed
    /// mid-refinement rather than reaching the target or a fixed point.
    pub timed_out: bool,
}

pub fn refine(input: &str, language: LanguageKind, cfg: &ReflectionConfig) -> RefineResult {
    let start = Instant::now();
    let mut current = input.to_string();
    let mut best = score_fragment(&current, language);
    let mut history = Vec::new();
    let mut timed_out = false;

    info!(
        target = cfg.target_composite,
        budget = cfg.loop_budget,
        initial = best.composite,
        "reflection_loop::refine start"
    );

    for loop_index in 1..=cfg.loop_budget {
        if best.composite >= cfg.target_composite {
            break;
        }
        if start.elapsed() >= cfg.loop_time_budget {
            timed_out = true;
            break;
        }

        let variants = propose_variants(&current, language);
        let mut winner: Option<(&'static str, String, CoherencyRecord)> = None;
        for (name, candidate) in variants {
            let record = score_fragment(&candidate, language);
            let is_better = winner
                .as_ref()
                .map(|(_, _, best_so_far)| record.composite > best_so_far.composite)
                .unwrap_or(true);
            if is_better {
                winner = Some((name, candidate, record));
            }
        }
        let (name, candidate, record) = winner.expect("propose_variants never returns empty");

        if record.composite <= best.composite {
            debug!(loop_index, "reflection_loop::refine no progress, stopping");
            break;
        }

        debug!(loop_index, transform = name, composite = record.composite, "reflection_loop::refine improved");
        current = candidate;
        history.push(HistoryEntry {
            loop_index,
            transform: name.to_string(),
            composite: record.composite,
        });
        best = record;
    }

    RefineResult {
        code: current,
        record: best,
        history,
        timed_out,
    }
}

fn score_fragment(code: &str, language: LanguageKind) -> CoherencyRecord {
    coherency_scorer::score(&ScoreInput {
        code,
        language,
        test_code: None,
        test_reference: "",
        reliability_history: None,
    })
}
