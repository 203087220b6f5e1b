//! Synchronous request/response facade mapping tool names onto the core
//! operations (SPEC_FULL.md §4.J Dispatcher). This crate builds the
//! *logical* request/response shape only; the JSON-RPC stdio loop that
//! frames it is an external collaborator, per Non-goals.

pub mod errors;
mod requests;

pub use errors::ToolError;
pub use requests::{KNOWN_TOOLS, ToolOutcome, ToolRequest, ToolResponse, route};

use candidate_pipeline::{CandidateStore, GenerationMethod};
use coherency_scorer::{ScoreInput, covenant_check, score};
use deduplicator::{DeduplicationConfig, DuplicateCheck, parse_language};
use federation::Tiers;
use harvester::{CloneRequest, GitClone, HarvestConfig};
use lexical_analyzers::{LanguageKind, extract_function_spans};
use pattern_store::{PatternFilter, PatternStore};
use reflection_loop::ReflectionConfig;
use relevance_engine::RelevanceQuery;
use std::path::Path;
use tracing::info;
use uuid::Uuid;
use verifier_api::Verifier;

/// Deterministic UUIDv5 namespace for candidate/pattern ids derived from a
/// fingerprint, mirroring the teacher's `uuid_v5_from_key` convention —
/// same fingerprint always yields the same id, so re-submitting identical
/// code is a no-op at the store layer as well as the dedup layer.
const ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6f, 0x70, 0x65, 0x6e, 0x2d, 0x70, 0x61, 0x74, 0x74, 0x65, 0x72, 0x6e, 0x2d, 0x65, 0x6e, 0x67,
]);

fn id_from_fingerprint(fingerprint: &str) -> String {
    Uuid::new_v5(&ID_NAMESPACE, fingerprint.as_bytes()).to_string()
}

/// The symbol/file-stem a test is expected to textually reference, per
/// `coherency_scorer::test_proof`'s own contract. Passing the whole source
/// here instead would make the test-proof penalty branch fire on almost
/// any well-tested submission. Falls back to the empty string (no
/// reference check) when no function span can be extracted.
fn symbol_reference(code: &str, language: LanguageKind) -> String {
    extract_function_spans(code, language)
        .ok()
        .and_then(|spans| spans.into_iter().next())
        .map(|span| span.name)
        .unwrap_or_default()
}

pub struct Dispatcher<'a> {
    pub local: &'a PatternStore,
    pub personal: &'a PatternStore,
    pub community: &'a PatternStore,
    pub candidates: &'a CandidateStore,
    pub verifier: &'a dyn Verifier,
    pub git_clone: &'a dyn GitClone,
}

impl<'a> Dispatcher<'a> {
    fn tiers(&self) -> Tiers<'_> {
        Tiers {
            local: self.local,
            personal: self.personal,
            community: self.community,
        }
    }

    /// Dispatches one already-routed request. Parameter validation has
    /// already happened in [`route`]; everything that can still fail here
    /// is a handler-level error (store I/O, verifier failure), mapped to
    /// `INTERNAL` without leaking a `Debug` backtrace.
    pub async fn handle(&self, request: ToolRequest) -> Result<serde_json::Value, ToolError> {
        match request {
            ToolRequest::Submit {
                code,
                language,
                description,
                tags,
                test_code,
            } => self.submit(code, language, description, tags, test_code),
            ToolRequest::Search {
                text,
                language,
                tags,
                limit,
            } => self.search(text, language, tags, limit),
            ToolRequest::Reflect { code, language } => self.reflect(code, language),
            ToolRequest::Promote { max_per_run } => self.promote(max_per_run).await,
            ToolRequest::Harvest { root } => self.harvest(root),
            ToolRequest::HarvestRemote { url, branch, depth } => {
                self.harvest_remote(url, branch, depth).await
            }
            ToolRequest::Push => self.push(),
            ToolRequest::Share {
                allow_copyleft_override,
            } => self.share(allow_copyleft_override.unwrap_or(false)),
            ToolRequest::Pull { language } => self.pull(language),
            ToolRequest::FederatedQuery {
                text,
                language,
                tags,
                limit,
            } => self.federated_query(text, language, tags, limit),
            ToolRequest::RecordUsage {
                pattern_id,
                succeeded,
            } => self.record_usage(pattern_id, succeeded),
            ToolRequest::RecordBug {
                pattern_id,
                description,
            } => self.record_bug(pattern_id, description),
            ToolRequest::Retag { pattern_id, tags } => self.retag(pattern_id, tags),
        }
    }

    fn submit(
        &self,
        code: String,
        language: String,
        description: String,
        tags: Vec<String>,
        test_code: Option<String>,
    ) -> Result<serde_json::Value, ToolError> {
        let lang = parse_language(&language);
        let dedup = deduplicator::check(self.local, &code, &language, &DeduplicationConfig::default())?;
        if let DuplicateCheck::Duplicate(existing) = dedup {
            return Ok(serde_json::json!({ "status": "duplicate", "pattern_id": existing.id }));
        }

        let reference = symbol_reference(&code, lang);
        let record = score(&ScoreInput {
            code: &code,
            language: lang,
            test_code: test_code.as_deref(),
            test_reference: &reference,
            reliability_history: None,
        });
        let covenant = covenant_check(&code);
        let fingerprint = deduplicator::fingerprint(&code, lang);
        let id = id_from_fingerprint(&fingerprint);

        let candidate = candidate_pipeline::submit(
            id,
            code,
            language,
            description,
            tags,
            fingerprint,
            record,
            covenant.sealed,
            GenerationMethod::Variant,
        );
        let accepted = self.candidates.put_if_new(&candidate)?;
        info!(id = %candidate.id, state = ?candidate.state, accepted, "dispatcher::submit");
        Ok(serde_json::json!({
            "status": if accepted { "accepted" } else { "already-known" },
            "candidate_id": candidate.id,
            "state": candidate.state,
            "composite": candidate.coherency.composite,
            "covenant_sealed": covenant.sealed,
        }))
    }

    fn search(
        &self,
        text: String,
        language: Option<String>,
        tags: Vec<String>,
        limit: Option<usize>,
    ) -> Result<serde_json::Value, ToolError> {
        let patterns = self.local.iter(&PatternFilter::default())?;
        let query = RelevanceQuery { text, language, tags };
        let matches = relevance_engine::rank(&patterns, &query, limit);
        Ok(serde_json::to_value(matches).map_err(ToolError::internal)?)
    }

    /// Runs the bounded reflection loop and, when it improves on the input,
    /// submits the refined code as a new `Candidate` tagged
    /// `iterative-refine`. This closes the Maintenance flow (Candidate ->
    /// Exhausted/Proven -> reflect -> submit -> promote -> Candidate)
    /// instead of handing the refined code back without ever re-entering
    /// the pipeline.
    fn reflect(&self, code: String, language: String) -> Result<serde_json::Value, ToolError> {
        let lang = parse_language(&language);
        let result = reflection_loop::refine(&code, lang, &ReflectionConfig::default());

        let mut candidate_id = None;
        if result.code != code {
            let reference = symbol_reference(&result.code, lang);
            let covenant = covenant_check(&result.code);
            let fingerprint = deduplicator::fingerprint(&result.code, lang);
            let id = id_from_fingerprint(&fingerprint);
            let record = score(&ScoreInput {
                code: &result.code,
                language: lang,
                test_code: None,
                test_reference: &reference,
                reliability_history: None,
            });
            let candidate = candidate_pipeline::submit(
                id,
                result.code.clone(),
                language,
                String::new(),
                Vec::new(),
                fingerprint,
                record,
                covenant.sealed,
                GenerationMethod::IterativeRefine,
            );
            self.candidates.put_if_new(&candidate)?;
            candidate_id = Some(candidate.id);
        }

        let mut value = serde_json::to_value(&result).map_err(ToolError::internal)?;
        value["candidate_id"] = serde_json::json!(candidate_id);
        Ok(value)
    }

    async fn promote(&self, max_per_run: Option<usize>) -> Result<serde_json::Value, ToolError> {
        let summary = candidate_pipeline::auto_promote(
            self.candidates,
            self.local,
            self.verifier,
            max_per_run.unwrap_or(candidate_pipeline::MAX_PER_RUN),
        )
        .await?;
        Ok(serde_json::to_value(summary).map_err(ToolError::internal)?)
    }

    fn harvest(&self, root: String) -> Result<serde_json::Value, ToolError> {
        let fragments = harvester::harvest(Path::new(&root), &HarvestConfig::default())?;
        self.ingest_harvested(fragments)
    }

    /// Materializes `url` via [`GitClone`], harvests it exactly as
    /// [`Self::harvest`] would a local root, then deletes the clone
    /// (`harvester::harvest_remote`), before running the same
    /// dedup/score/submit ingestion as a local harvest.
    async fn harvest_remote(
        &self,
        url: String,
        branch: Option<String>,
        depth: Option<u32>,
    ) -> Result<serde_json::Value, ToolError> {
        let request = CloneRequest {
            url,
            branch,
            depth: depth.unwrap_or(1),
        };
        let fragments =
            harvester::harvest_remote(self.git_clone, request, &HarvestConfig::default()).await?;
        self.ingest_harvested(fragments)
    }

    fn ingest_harvested(
        &self,
        fragments: Vec<harvester::HarvestedFragment>,
    ) -> Result<serde_json::Value, ToolError> {
        let mut submitted = 0usize;
        let mut duplicates = 0usize;
        let mut rejected = 0usize;

        for fragment in &fragments {
            let lang_str = format!("{:?}", fragment.language).to_lowercase();
            let dedup = deduplicator::check(
                self.local,
                &fragment.code,
                &lang_str,
                &DeduplicationConfig::default(),
            )?;
            if !matches!(dedup, DuplicateCheck::Unique) {
                duplicates += 1;
                continue;
            }

            let reference = fragment.function_name.clone().unwrap_or_default();
            let record = score(&ScoreInput {
                code: &fragment.code,
                language: fragment.language,
                test_code: None,
                test_reference: &reference,
                reliability_history: None,
            });
            let covenant = covenant_check(&fragment.code);
            let fingerprint = deduplicator::fingerprint(&fragment.code, fragment.language);
            let id = id_from_fingerprint(&fingerprint);
            let candidate = candidate_pipeline::submit(
                id,
                fragment.code.clone(),
                lang_str,
                fragment.function_name.clone().unwrap_or_default(),
                Vec::new(),
                fingerprint,
                record,
                covenant.sealed,
                GenerationMethod::Harvest,
            );
            if candidate.state == candidate_pipeline::CandidateState::Rejected {
                rejected += 1;
                continue;
            }
            if self.candidates.put_if_new(&candidate)? {
                submitted += 1;
            } else {
                duplicates += 1;
            }
        }

        info!(scanned = fragments.len(), submitted, duplicates, rejected, "dispatcher::harvest");
        Ok(serde_json::json!({
            "scanned": fragments.len(),
            "submitted": submitted,
            "duplicates": duplicates,
            "rejected": rejected,
        }))
    }

    fn push(&self) -> Result<serde_json::Value, ToolError> {
        let summary = federation::push(self.local, self.personal)?;
        Ok(serde_json::to_value(summary).map_err(ToolError::internal)?)
    }

    fn share(&self, allow_copyleft_override: bool) -> Result<serde_json::Value, ToolError> {
        let outcomes = federation::share(self.personal, self.community, allow_copyleft_override)?;
        Ok(serde_json::to_value(outcomes).map_err(ToolError::internal)?)
    }

    fn pull(&self, language: Option<String>) -> Result<serde_json::Value, ToolError> {
        let summary = federation::pull(self.community, self.local, language.as_deref())?;
        Ok(serde_json::to_value(summary).map_err(ToolError::internal)?)
    }

    fn federated_query(
        &self,
        text: String,
        language: Option<String>,
        tags: Vec<String>,
        limit: Option<usize>,
    ) -> Result<serde_json::Value, ToolError> {
        let query = RelevanceQuery { text, language, tags };
        let matches = federation::federated_query(&self.tiers(), &query, limit)?;
        Ok(serde_json::to_value(matches).map_err(ToolError::internal)?)
    }

    fn record_usage(&self, pattern_id: String, succeeded: bool) -> Result<serde_json::Value, ToolError> {
        self.local.record_usage(&pattern_id, succeeded)?;
        Ok(serde_json::json!({ "status": "recorded" }))
    }

    fn record_bug(&self, pattern_id: String, description: String) -> Result<serde_json::Value, ToolError> {
        self.local.record_bug(&pattern_id, description)?;
        Ok(serde_json::json!({ "status": "recorded" }))
    }

    fn retag(&self, pattern_id: String, tags: Vec<String>) -> Result<serde_json::Value, ToolError> {
        let updated = self.local.retag(&pattern_id, &tags)?;
        Ok(serde_json::json!({ "pattern_id": updated.id, "tags": updated.tags }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;
    use verifier_api::{VerifierError, VerifyRequest, VerifyResult};

    struct AlwaysPasses;
    impl Verifier for AlwaysPasses {
        fn verify<'a>(
            &'a self,
            _request: &'a VerifyRequest,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<VerifyResult, VerifierError>> + Send + 'a>> {
            Box::pin(async {
                Ok(VerifyResult {
                    passed: true,
                    output: "ok".into(),
                    duration_ms: 1,
                })
            })
        }
    }

    struct StubClone {
        materialize_into: std::path::PathBuf,
    }

    impl GitClone for StubClone {
        fn clone_repo(
            &self,
            _request: CloneRequest,
        ) -> Pin<Box<dyn Future<Output = harvester::Result<std::path::PathBuf>> + Send + '_>> {
            let dir = self.materialize_into.clone();
            Box::pin(async move { Ok(dir) })
        }
    }

    fn dispatcher_with<'a>(
        local: &'a PatternStore,
        personal: &'a PatternStore,
        community: &'a PatternStore,
        candidates: &'a CandidateStore,
        verifier: &'a dyn Verifier,
        git_clone: &'a dyn GitClone,
    ) -> Dispatcher<'a> {
        Dispatcher {
            local,
            personal,
            community,
            candidates,
            verifier,
            git_clone,
        }
    }

    #[tokio::test]
    async fn submit_then_promote_lands_pattern_in_local_store() {
        let local = PatternStore::open_in_memory().unwrap();
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();
        let candidates = CandidateStore::open_in_memory().unwrap();
        let verifier = AlwaysPasses;
        let clone = StubClone { materialize_into: std::path::PathBuf::from(".") };
        let d = dispatcher_with(&local, &personal, &community, &candidates, &verifier, &clone);

        let req = route(
            "submit",
            serde_json::json!({
                "code": "function add(a, b) {\n    return a + b;\n}\nfunction addTest() { expect(add(1,2)).toBe(3); expect(add(0,0)).toBe(0); }",
                "language": "js",
                "test_code": null,
            }),
        )
        .unwrap();
        let submitted = d.handle(req).await.unwrap();
        assert_eq!(submitted["status"], "accepted");

        let promote_req = route("promote", serde_json::json!({ "max_per_run": null })).unwrap();
        let promoted = d.handle(promote_req).await.unwrap();
        assert_eq!(promoted["promoted"], 1);
    }

    #[tokio::test]
    async fn search_returns_empty_on_empty_store() {
        let local = PatternStore::open_in_memory().unwrap();
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();
        let candidates = CandidateStore::open_in_memory().unwrap();
        let verifier = AlwaysPasses;
        let clone = StubClone { materialize_into: std::path::PathBuf::from(".") };
        let d = dispatcher_with(&local, &personal, &community, &candidates, &verifier, &clone);

        let req = route("search", serde_json::json!({ "text": "sort array" })).unwrap();
        let result = d.handle(req).await.unwrap();
        assert_eq!(result.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn reflect_improves_unhealthy_code() {
        let local = PatternStore::open_in_memory().unwrap();
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();
        let candidates = CandidateStore::open_in_memory().unwrap();
        let verifier = AlwaysPasses;
        let clone = StubClone { materialize_into: std::path::PathBuf::from(".") };
        let d = dispatcher_with(&local, &personal, &community, &candidates, &verifier, &clone);

        let req = route(
            "reflect",
            serde_json::json!({ "code": "var x = 1;   \nif(x == 1){foo()}", "language": "js" }),
        )
        .unwrap();
        let result = d.handle(req).await.unwrap();
        assert!(result["code"].as_str().unwrap().contains("const x = 1;"));
    }

    #[tokio::test]
    async fn record_usage_and_retag_round_trip() {
        let local = PatternStore::open_in_memory().unwrap();
        let personal = PatternStore::open_in_memory().unwrap();
        let community = PatternStore::open_in_memory().unwrap();
        let candidates = CandidateStore::open_in_memory().unwrap();
        let verifier = AlwaysPasses;
        let clone = StubClone { materialize_into: std::path::PathBuf::from(".") };
        let d = dispatcher_with(&local, &personal, &community, &candidates, &verifier, &clone);

        let now = chrono::Utc::now();
        local
            .put(&pattern_store::Pattern {
                id: "p1".into(),
                name: "p1".into(),
                language: "js".into(),
                tags: vec!["array".into()],
                code: "function f() {}".into(),
                description: "sample pattern".into(),
                test_code: None,
                fingerprint: "fp-p1".into(),
                coherency: coherency_scorer::CoherencyRecord::new(1.0, 1.0, 1.0, 1.0, 1.0),
                usage: pattern_store::UsageStats::default(),
                bugs: Vec::new(),
                provenance: None,
                lineage_parent: None,
                version: 0,
                retired: false,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        let usage_req = route(
            "record_usage",
            serde_json::json!({ "pattern_id": "p1", "succeeded": true }),
        )
        .unwrap();
        d.handle(usage_req).await.unwrap();
        assert_eq!(local.get("p1").unwrap().usage.times_applied, 1);

        let retag_req = route(
            "retag",
            serde_json::json!({ "pattern_id": "p1", "tags": ["numeric", "sort"] }),
        )
        .unwrap();
        let retagged = d.handle(retag_req).await.unwrap();
        assert_eq!(retagged["tags"], serde_json::json!(["numeric", "sort"]));
    }

    #[test]
    fn id_from_fingerprint_is_deterministic() {
        assert_eq!(id_from_fingerprint("abc123"), id_from_fingerprint("abc123"));
        assert_ne!(id_from_fingerprint("abc123"), id_from_fingerprint("xyz789"));
    }
}
