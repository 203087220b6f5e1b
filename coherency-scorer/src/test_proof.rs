//! Test-proof sub-score and the companion-test-file name-mangling rule
//! (SPEC_FULL.md §4.B). The scorer itself never touches the filesystem —
//! callers (the Harvester, `submit`) resolve `test_code` beforehand; this
//! module only offers the pure path-mangling helper they should use to do
//! that lookup, plus the pure scoring function.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static ASSERTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"assert\w*(?:\.\w+)?\s*\(|expect\s*\(|should\.\w+|\.toBe\(|\.toEqual\(").unwrap()
});

/// Score a resolved test file's content against the source it's meant to
/// exercise. `source_reference` is typically the pattern's file stem or
/// exported symbol name, used to check the test textually references it.
pub fn test_proof_score(test_code: Option<&str>, source_reference: &str) -> f64 {
    let Some(tc) = test_code else {
        return 0.0;
    };
    if !source_reference.is_empty() && !tc.contains(source_reference) {
        return 0.3;
    }
    let count = ASSERTION_RE.find_iter(tc).count();
    match count {
        c if c >= 10 => 1.0,
        c if c >= 5 => 0.85,
        c if c >= 2 => 0.7,
        c if c >= 1 => 0.5,
        _ => 0.3,
    }
}

/// The fixed name-mangling rule for locating a companion test file, as a
/// pure function over paths (no I/O) — callers stat/read the results.
pub fn companion_test_candidates(source_path: &Path) -> Vec<PathBuf> {
    let Some(parent) = source_path.parent() else {
        return Vec::new();
    };
    let Some(stem) = source_path.file_stem().and_then(|s| s.to_str()) else {
        return Vec::new();
    };
    let Some(ext) = source_path.extension().and_then(|s| s.to_str()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for suffix in ["test", "spec"] {
        out.push(parent.join(format!("{stem}.{suffix}.{ext}")));
        for dir in ["tests", "test", "__tests__"] {
            out.push(parent.join(dir).join(format!("{stem}.{suffix}.{ext}")));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_test_code_scores_zero() {
        assert_eq!(test_proof_score(None, "add"), 0.0);
    }

    #[test]
    fn unreferenced_test_scores_low() {
        let tc = "describe('unrelated', () => { expect(1).toBe(1); });";
        assert_eq!(test_proof_score(Some(tc), "add"), 0.3);
    }

    #[test]
    fn many_assertions_scores_one() {
        let tc = (0..10)
            .map(|i| format!("assert.equal(add({i}, 1), {});\n", i + 1))
            .collect::<String>();
        assert_eq!(test_proof_score(Some(&tc), "add"), 1.0);
    }

    #[test]
    fn single_assertion_scores_half() {
        let tc = "assert.equal(add(2,3), 5)";
        assert_eq!(test_proof_score(Some(tc), "add"), 0.5);
    }

    #[test]
    fn companion_candidates_cover_mangling_rule() {
        let p = Path::new("src/math.js");
        let candidates = companion_test_candidates(p);
        assert!(candidates.contains(&PathBuf::from("src/math.test.js")));
        assert!(candidates.contains(&PathBuf::from("src/__tests__/math.spec.js")));
    }
}
