//! Deterministic, lex-sorted directory walk (SPEC_FULL.md §4.G), grounded
//! on `codegraph-prep::core::fs_scan`: same `walkdir` + skip-set shape, but
//! entries are sorted before emission instead of streamed in walkdir's
//! native order, so two runs over the same tree produce the same sequence.

use crate::config::{HarvestConfig, SKIP_DIRS};
use lexical_analyzers::LanguageKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub language: LanguageKind,
    pub size: u64,
}

fn detect_language(path: &Path) -> Option<LanguageKind> {
    match path.extension().and_then(|e| e.to_str())? {
        "js" | "jsx" | "mjs" | "cjs" => Some(LanguageKind::Js),
        "ts" | "tsx" => Some(LanguageKind::Ts),
        "py" => Some(LanguageKind::Py),
        "go" => Some(LanguageKind::Go),
        "rs" => Some(LanguageKind::Rust),
        _ => None,
    }
}

fn keep_entry(entry: &DirEntry) -> bool {
    if entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            return !SKIP_DIRS.contains(&name);
        }
    }
    true
}

/// Walks `root`, returning every supported source file in lexicographic
/// path order, skipping oversized files and capping the total at
/// `max_files`.
pub fn scan(root: &Path, cfg: &HarvestConfig) -> crate::errors::Result<Vec<ScannedFile>> {
    if !root.exists() {
        return Err(crate::errors::HarvestError::MissingRoot(root.to_path_buf()));
    }

    let mut entries: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(keep_entry)
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    entries.sort();

    let mut files = Vec::new();
    for path in entries {
        if files.len() >= cfg.max_files {
            debug!(max_files = cfg.max_files, "harvester::scan max_files reached");
            break;
        }
        let Some(language) = detect_language(&path) else {
            continue;
        };
        let size = match std::fs::metadata(&path) {
            Ok(m) => m.len(),
            Err(_) => continue,
        };
        if size > cfg.max_file_size {
            debug!(path = %path.display(), size, "harvester::scan skip oversized file");
            continue;
        }
        files.push(ScannedFile { path, language, size });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn scan_skips_vendor_dirs_and_sorts_lexically() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        fs::write(dir.path().join("node_modules/skip.js"), "function f() {}").unwrap();
        fs::write(dir.path().join("b.js"), "function g() {}").unwrap();
        fs::write(dir.path().join("a.js"), "function h() {}").unwrap();

        let files = scan(dir.path(), &HarvestConfig::default()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.js".to_string(), "b.js".to_string()]);
    }

    #[test]
    fn scan_skips_oversized_files() {
        let dir = tempfile::tempdir().unwrap();
        let big = "x".repeat(100);
        fs::write(dir.path().join("big.js"), big).unwrap();
        let cfg = HarvestConfig {
            max_file_size: 10,
            ..HarvestConfig::default()
        };
        let files = scan(dir.path(), &cfg).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn scan_missing_root_is_an_error() {
        let result = scan(Path::new("/nonexistent/harvester-test-root"), &HarvestConfig::default());
        assert!(result.is_err());
    }
}
