//! Trait boundary for the external verifier collaborator (SPEC_FULL.md §6).
//! No concrete child-process verifier is implemented here, per Non-goals —
//! `candidate-pipeline` and `dispatcher` depend on this trait so a concrete
//! implementation can be plugged in without either crate depending on the
//! other.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifierError {
    #[error("verifier timed out after {0:?}")]
    Timeout(Duration),
    #[error("verifier transport error: {0}")]
    Transport(String),
}

pub struct VerifyRequest {
    pub code: String,
    pub test_code: String,
    pub language: String,
}

pub struct VerifyResult {
    pub passed: bool,
    pub output: String,
    pub duration_ms: u64,
}

/// Must complete within the caller-supplied timeout (default 60s,
/// SPEC_FULL.md §5 "Cancellation and timeouts"). The core trusts this
/// collaborator for protocol conformance but not for correctness — it may
/// return false positives or negatives.
pub trait Verifier: Send + Sync {
    fn verify<'a>(
        &'a self,
        request: &'a VerifyRequest,
        timeout: Duration,
    ) -> Pin<Box<dyn Future<Output = Result<VerifyResult, VerifierError>> + Send + 'a>>;
}
