//! Canonical data model stored and returned by the pattern store
//! (SPEC_FULL.md §3 Pattern).

use chrono::{DateTime, Utc};
use coherency_scorer::CoherencyRecord;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    pub times_applied: u32,
    pub times_succeeded: u32,
}

impl UsageStats {
    /// Fraction of applications that succeeded; neutral (1.0) when never used,
    /// so an untested pattern isn't penalized ahead of evidence.
    pub fn success_rate(&self) -> f64 {
        if self.times_applied == 0 {
            1.0
        } else {
            self.times_succeeded as f64 / self.times_applied as f64
        }
    }
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            times_applied: 0,
            times_succeeded: 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BugReport {
    pub reported_at: DateTime<Utc>,
    pub description: String,
}

/// Where a pattern came from, attached at share time and never mutated by
/// downstream tiers.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Provenance {
    pub source_url: Option<String>,
    pub source_commit: Option<String>,
    pub source_license: Option<String>,
    pub source_file: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub language: String,
    pub tags: Vec<String>,
    pub code: String,
    pub description: String,
    pub test_code: Option<String>,
    /// 16 hex-character SHA-256 prefix of the normalized code, as produced
    /// by the deduplicator.
    pub fingerprint: String,
    pub coherency: CoherencyRecord,
    pub usage: UsageStats,
    pub bugs: Vec<BugReport>,
    pub provenance: Option<Provenance>,
    /// Id of the pattern this one was derived from, if any. Forms a DAG;
    /// the pipeline rejects cycles at promotion time.
    pub lineage_parent: Option<String>,
    /// Optimistic-concurrency version counter, incremented on every update.
    pub version: u32,
    /// Flag-only retirement: excluded from retrieval, never deleted.
    pub retired: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single retained prior revision, kept in the version history ring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternSnapshot {
    pub version: u32,
    pub code: String,
    pub coherency: CoherencyRecord,
    pub recorded_at: DateTime<Utc>,
}

/// Predicate used by [`crate::PatternStore::iter`] to narrow a scan.
#[derive(Clone, Debug, Default)]
pub struct PatternFilter {
    pub language: Option<String>,
    pub tag: Option<String>,
    pub min_composite: Option<f64>,
}

impl PatternFilter {
    pub fn matches(&self, p: &Pattern) -> bool {
        if let Some(lang) = &self.language {
            if &p.language != lang {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !p.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(min) = self.min_composite {
            if p.coherency.composite < min {
                return false;
            }
        }
        true
    }
}
