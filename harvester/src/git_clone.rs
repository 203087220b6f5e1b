//! Trait boundary for the external Git-clone collaborator (SPEC_FULL.md
//! §6), implemented here by wrapping `project_code_store` nearly verbatim
//! (§4.G "carried from the teacher"). `branch`/`depth` are accepted by the
//! trait per the spec's interface shape but not yet honored by the
//! underlying `clone_list` helper, which always does a full default-branch
//! clone — noted in DESIGN.md rather than silently ignored here.

use crate::errors::{HarvestError, Result};
use std::path::PathBuf;

pub struct CloneRequest {
    pub url: String,
    pub branch: Option<String>,
    pub depth: u32,
}

/// Materializes a remote repository into a local directory that the caller
/// is responsible for deleting once done (SPEC_FULL.md §6 "Git-clone
/// collaborator").
pub trait GitClone: Send + Sync {
    fn clone_repo(
        &self,
        request: CloneRequest,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PathBuf>> + Send + '_>>;
}

pub struct ProjectCodeStoreClone {
    pub project_name: String,
}

impl GitClone for ProjectCodeStoreClone {
    fn clone_repo(
        &self,
        request: CloneRequest,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PathBuf>> + Send + '_>> {
        let project_name = self.project_name.clone();
        Box::pin(async move {
            let repo_name = repo_name_from_url(&request.url);
            project_code_store::clone_list(vec![request.url.clone()], 1, &project_name)
                .await
                .map_err(|e| HarvestError::Clone(e.to_string()))?;
            Ok(PathBuf::from("code_data").join(&project_name).join(repo_name))
        })
    }
}

fn repo_name_from_url(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let last = if let Some(i) = trimmed.rfind('/') {
        &trimmed[i + 1..]
    } else if let Some(i) = trimmed.rfind(':') {
        &trimmed[i + 1..]
    } else {
        trimmed
    };
    last.trim_end_matches(".git").to_string()
}
