//! Walks a source tree (or a cloned remote repository) and emits one
//! harvested fragment per function or per file (SPEC_FULL.md §4.G). Feeding
//! each fragment into the Candidate Pipeline is the caller's job — the
//! harvester only discovers and reads source, it never scores or stores.

pub mod config;
pub mod errors;
pub mod git_clone;
mod walker;

pub use config::{HarvestConfig, SplitMode};
pub use errors::{HarvestError, Result};
pub use git_clone::{CloneRequest, GitClone, ProjectCodeStoreClone};
pub use walker::{ScannedFile, scan};

use lexical_analyzers::{FunctionSpan, LanguageKind, extract_function_spans, is_denied};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct HarvestedFragment {
    pub source_path: PathBuf,
    pub language: LanguageKind,
    pub function_name: Option<String>,
    pub code: String,
}

/// Walks `root` and emits fragments in the deterministic order `scan`
/// produces. A file whose span extraction fails is logged and skipped
/// rather than aborting the whole harvest.
pub fn harvest(root: &Path, cfg: &HarvestConfig) -> Result<Vec<HarvestedFragment>> {
    let files = scan(root, cfg)?;
    info!(count = files.len(), "harvester::harvest scanning complete");

    let mut fragments = Vec::new();
    for file in files {
        let source = match std::fs::read_to_string(&file.path) {
            Ok(s) => s,
            Err(err) => {
                warn!(path = %file.path.display(), error = %err, "harvester::harvest unreadable file, skipping");
                continue;
            }
        };

        match cfg.split_mode {
            SplitMode::File => {
                fragments.push(HarvestedFragment {
                    source_path: file.path.clone(),
                    language: file.language,
                    function_name: None,
                    code: source,
                });
            }
            SplitMode::Function => {
                let spans = match extract_function_spans(&source, file.language) {
                    Ok(spans) => spans,
                    Err(err) => {
                        warn!(path = %file.path.display(), error = %err, "harvester::harvest span extraction failed, skipping");
                        continue;
                    }
                };
                let kept: Vec<&FunctionSpan> = spans
                    .iter()
                    .filter(|s| !is_denied(&s.name, file.language))
                    .collect();
                if kept.len() < cfg.min_functions_per_file {
                    continue;
                }
                for span in kept {
                    fragments.push(HarvestedFragment {
                        source_path: file.path.clone(),
                        language: file.language,
                        function_name: Some(span.name.clone()),
                        code: source[span.start..span.end].to_string(),
                    });
                }
            }
        }
    }

    info!(fragments = fragments.len(), "harvester::harvest complete");
    Ok(fragments)
}

/// Materializes `request` via `clone` into a local directory, harvests it
/// exactly as [`harvest`] would a local root, then deletes the directory
/// regardless of whether harvesting succeeded (SPEC_FULL.md §4.G: "the
/// harvester cooperates with an external Git-clone collaborator to
/// materialize a directory, then operates normally, then deletes the
/// directory").
pub async fn harvest_remote(
    clone: &dyn GitClone,
    request: CloneRequest,
    cfg: &HarvestConfig,
) -> Result<Vec<HarvestedFragment>> {
    let dir = clone.clone_repo(request).await?;
    let result = harvest(&dir, cfg);
    if let Err(err) = std::fs::remove_dir_all(&dir) {
        warn!(path = %dir.display(), error = %err, "harvester::harvest_remote cleanup failed");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn harvest_function_mode_emits_one_fragment_per_function() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("math.js"),
            "function add(a, b) {\n    return a + b;\n}\n\nfunction sub(a, b) {\n    return a - b;\n}\n",
        )
        .unwrap();

        let fragments = harvest(dir.path(), &HarvestConfig::default()).unwrap();
        let names: Vec<_> = fragments.iter().filter_map(|f| f.function_name.clone()).collect();
        assert_eq!(names, vec!["add".to_string(), "sub".to_string()]);
    }

    #[test]
    fn harvest_file_mode_emits_one_fragment_per_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("math.js"), "function add(a, b) { return a + b; }").unwrap();
        let cfg = HarvestConfig {
            split_mode: SplitMode::File,
            ..HarvestConfig::default()
        };
        let fragments = harvest(dir.path(), &cfg).unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].function_name.is_none());
    }

    #[test]
    fn harvest_respects_min_functions_per_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("one_fn.js"), "function add(a, b) { return a + b; }").unwrap();
        let cfg = HarvestConfig {
            min_functions_per_file: 2,
            ..HarvestConfig::default()
        };
        let fragments = harvest(dir.path(), &cfg).unwrap();
        assert!(fragments.is_empty());
    }

    struct StubClone {
        materialize_into: PathBuf,
    }

    impl GitClone for StubClone {
        fn clone_repo(
            &self,
            _request: CloneRequest,
        ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<PathBuf>> + Send + '_>> {
            let dir = self.materialize_into.clone();
            Box::pin(async move { Ok(dir) })
        }
    }

    #[tokio::test]
    async fn harvest_remote_cleans_up_the_cloned_directory_after_harvesting() {
        let dir = tempfile::tempdir().unwrap();
        let cloned_path = dir.path().join("cloned_repo");
        fs::create_dir_all(&cloned_path).unwrap();
        fs::write(cloned_path.join("math.js"), "function add(a, b) { return a + b; }").unwrap();

        let clone = StubClone {
            materialize_into: cloned_path.clone(),
        };
        let request = CloneRequest {
            url: "https://example.com/org/repo.git".to_string(),
            branch: None,
            depth: 1,
        };

        let fragments = harvest_remote(&clone, request, &HarvestConfig::default()).await.unwrap();
        assert_eq!(fragments.len(), 1);
        assert!(!cloned_path.exists());
    }
}
