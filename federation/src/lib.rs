//! Three-tier replication across local, personal, and community pattern
//! stores (SPEC_FULL.md §4.I). Every tier is an ordinary [`PatternStore`]
//! rooted at its own directory; replication is always a controlled copy
//! through the normal store API, never a shared connection or reference.

pub mod errors;
pub mod license;

pub use errors::{FederationError, Result};
pub use license::{LicenseCategory, is_allowed};

use pattern_store::{Pattern, PatternStore};
use relevance_engine::{RankedMatch, RelevanceQuery, rank};
use serde::Serialize;
use tracing::{info, warn};

/// Coherency floor a pattern must clear before it can be shared to the
/// community tier.
pub const SHARE_FLOOR: f64 = 0.7;

pub struct Tiers<'a> {
    pub local: &'a PatternStore,
    pub personal: &'a PatternStore,
    pub community: &'a PatternStore,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushSummary {
    pub copied: Vec<String>,
    pub already_present: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared(String),
    Skipped { id: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PullSummary {
    pub copied: Vec<String>,
    pub already_present: Vec<String>,
}

/// Copies every `local` pattern absent from `personal` (by id). Bidirectional
/// sync is this plus [`pull`] run the other way.
pub fn push(local: &PatternStore, personal: &PatternStore) -> Result<PushSummary> {
    let mut copied = Vec::new();
    let mut already_present = Vec::new();
    for pattern in local.iter(&Default::default())? {
        if personal.get(&pattern.id).is_ok() {
            already_present.push(pattern.id);
            continue;
        }
        personal.put(&pattern)?;
        copied.push(pattern.id);
    }
    info!(copied = copied.len(), "federation::push");
    Ok(PushSummary {
        copied,
        already_present,
    })
}

/// Shares every eligible `personal` pattern into `community`, skipping (with
/// a recorded reason) anything that fails a gate: coherency below
/// [`SHARE_FLOOR`], missing covenant seal, missing test code, or a license
/// not on the allow-list.
pub fn share(
    personal: &PatternStore,
    community: &PatternStore,
    allow_copyleft_override: bool,
) -> Result<Vec<ShareOutcome>> {
    let mut outcomes = Vec::new();
    for pattern in personal.iter(&Default::default())? {
        if let Some(reason) = share_gate_violation(&pattern, allow_copyleft_override) {
            warn!(id = %pattern.id, reason = %reason, "federation::share skipped");
            outcomes.push(ShareOutcome::Skipped {
                id: pattern.id,
                reason,
            });
            continue;
        }
        if community.get(&pattern.id).is_err() {
            community.put(&pattern)?;
        }
        outcomes.push(ShareOutcome::Shared(pattern.id));
    }
    Ok(outcomes)
}

fn share_gate_violation(pattern: &Pattern, allow_copyleft_override: bool) -> Option<String> {
    if pattern.coherency.composite < SHARE_FLOOR {
        return Some(format!(
            "composite {:.3} below share floor {:.3}",
            pattern.coherency.composite, SHARE_FLOOR
        ));
    }
    if !coherency_scorer::covenant_check(&pattern.code).sealed {
        return Some("missing covenant seal".to_string());
    }
    if pattern.test_code.is_none() {
        return Some("no test code attached".to_string());
    }
    let license = pattern
        .provenance
        .as_ref()
        .and_then(|p| p.source_license.as_deref());
    match license {
        None => Some("no license attached".to_string()),
        Some(spdx_id) => {
            let (allowed, reason) = is_allowed(spdx_id, allow_copyleft_override);
            if allowed { None } else { Some(reason.to_string()) }
        }
    }
}

/// Copies every `community` pattern absent from `local` (optionally
/// filtered by language) into `local`. Each pulled pattern keeps its id —
/// cross-tier identity is decidable by id equality — but the local store
/// records its own copy rather than sharing the community connection.
pub fn pull(community: &PatternStore, local: &PatternStore, language: Option<&str>) -> Result<PullSummary> {
    let mut copied = Vec::new();
    let mut already_present = Vec::new();
    let filter = pattern_store::PatternFilter {
        language: language.map(str::to_string),
        ..Default::default()
    };
    for pattern in community.iter(&filter)? {
        if local.get(&pattern.id).is_ok() {
            already_present.push(pattern.id);
            continue;
        }
        local.put(&pattern)?;
        copied.push(pattern.id);
    }
    info!(copied = copied.len(), "federation::pull");
    Ok(PullSummary {
        copied,
        already_present,
    })
}

/// Runs the relevance engine against every tier and merges the results by
/// id, keeping the highest-coherency copy when a pattern exists in more
/// than one tier.
pub fn federated_query(tiers: &Tiers<'_>, query: &RelevanceQuery, limit: Option<usize>) -> Result<Vec<RankedMatch>> {
    let mut by_id: std::collections::HashMap<String, Pattern> = std::collections::HashMap::new();
    for store in [tiers.local, tiers.personal, tiers.community] {
        for pattern in store.iter(&Default::default())? {
            by_id
                .entry(pattern.id.clone())
                .and_modify(|existing| {
                    if pattern.coherency.composite > existing.coherency.composite {
                        *existing = pattern.clone();
                    }
                })
                .or_insert(pattern);
        }
    }
    let merged: Vec<Pattern> = by_id.into_values().collect();
    Ok(rank(&merged, query, limit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coherency_scorer::CoherencyRecord;
    use pattern_store::{Provenance, UsageStats};

    fn pattern(id: &str, composite: f64, license: Option<&str>, has_test: bool) -> Pattern {
        let now = Utc::now();
        Pattern {
            id: id.to_string(),
            name: id.to_string(),
            language: "js".to_string(),
            tags: Vec::new(),
            code: "function f() {}".to_string(),
            description: "sample pattern".to_string(),
            test_code: has_test.then(|| "test('f', () => expect(f()).toBe(1));".to_string()),
            fingerprint: format!("fp-{id}"),
            coherency: CoherencyRecord::new(composite, composite, composite, composite, composite),
            usage: UsageStats::default(),
            bugs: Vec::new(),
            provenance: license.map(|l| Provenance {
                source_license: Some(l.to_string()),
                ..Default::default()
            }),
            lineage_parent: None,
            version: 0,
            retired: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn push_copies_only_patterns_missing_from_personal() {
        let local = PatternStore::open_in_memory().unwrap();
        let personal = PatternStore::open_in_memory().unwrap();
        local.put(&pattern("p1", 1.0, None, false)).unwrap();
        local.put(&pattern("p2", 1.0, None, false)).unwrap();
        personal.put(&pattern("p1", 1.0, None, false)).unwrap();

        let summary = push(&local, &personal).unwrap();
        assert_eq!(summary.copied, vec!["p2".to_string()]);
        assert_eq!(summary.already_present, vec!["p1".to_string()]);
    }

    #[test]
    fn share_skips_patterns_below_floor_or_missing_test_code() {
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();
        personal.put(&pattern("low", 0.5, Some("MIT"), true)).unwrap();
        personal.put(&pattern("no-test", 0.9, Some("MIT"), false)).unwrap();
        personal.put(&pattern("good", 0.9, Some("MIT"), true)).unwrap();

        let outcomes = share(&personal, &community, false).unwrap();
        let shared: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                ShareOutcome::Shared(id) => Some(id.clone()),
                ShareOutcome::Skipped { .. } => None,
            })
            .collect();
        assert_eq!(shared, vec!["good".to_string()]);
        assert!(community.get("good").is_ok());
        assert!(community.get("low").is_err());
        assert!(community.get("no-test").is_err());
    }

    #[test]
    fn share_blocks_unrecognized_license_without_override() {
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();
        personal.put(&pattern("copyleft", 0.9, Some("GPL-3.0"), true)).unwrap();

        let outcomes = share(&personal, &community, false).unwrap();
        assert!(matches!(outcomes[0], ShareOutcome::Skipped { .. }));

        let outcomes_overridden = share(&personal, &community, true).unwrap();
        assert!(matches!(outcomes_overridden[0], ShareOutcome::Shared(_)));
    }

    #[test]
    fn pull_filters_by_language() {
        let community = PatternStore::open_in_memory().unwrap();
        let local = PatternStore::open_in_memory().unwrap();
        let mut rust_pattern = pattern("rs1", 1.0, None, false);
        rust_pattern.language = "rust".to_string();
        community.put(&rust_pattern).unwrap();
        community.put(&pattern("js1", 1.0, None, false)).unwrap();

        let summary = pull(&community, &local, Some("rust")).unwrap();
        assert_eq!(summary.copied, vec!["rs1".to_string()]);
        assert!(local.get("js1").is_err());
    }

    #[test]
    fn federated_query_merges_by_id_keeping_highest_coherency() {
        let local = PatternStore::open_in_memory().unwrap();
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();

        let mut stale = pattern("shared-id", 0.4, None, false);
        stale.name = "sort array".to_string();
        stale.code = "function sortArray(a) { return a.sort(); }".to_string();
        local.put(&stale).unwrap();

        let mut fresh = pattern("shared-id", 0.95, None, false);
        fresh.name = "sort array".to_string();
        fresh.code = "function sortArray(a) { return a.sort(); }".to_string();
        community.put(&fresh).unwrap();

        let tiers = Tiers {
            local: &local,
            personal: &personal,
            community: &community,
        };
        let query = RelevanceQuery {
            text: "sort array".to_string(),
            ..Default::default()
        };
        let results = federated_query(&tiers, &query, None).unwrap();
        assert_eq!(results.len(), 1);

        let expected = relevance_engine::relevance_score(&fresh, &query);
        assert!((results[0].score - expected).abs() < 1e-9);
    }
}
