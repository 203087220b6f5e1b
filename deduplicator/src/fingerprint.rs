//! Content fingerprinting (SPEC_FULL.md §4.H).

use lexical_analyzers::{LanguageKind, strip_noise};
use sha2::{Digest, Sha256};

/// Normalizes code (strip comments/strings noise, collapse whitespace
/// runs) then truncates a SHA-256 digest to 16 hex characters, matching
/// spec.md's fingerprint width.
pub fn fingerprint(code: &str, language: LanguageKind) -> String {
    let stripped = strip_noise(code, language);
    let normalized: String = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_code_fingerprints_match() {
        let a = fingerprint("function add(a, b) { return a + b; }", LanguageKind::Js);
        let b = fingerprint("function add(a, b) { return a + b; }", LanguageKind::Js);
        assert_eq!(a, b);
    }

    #[test]
    fn whitespace_and_comment_differences_still_match() {
        let a = fingerprint("function add(a, b) { return a + b; }", LanguageKind::Js);
        let b = fingerprint(
            "function add(a, b) {\n  // sum\n  return a + b;\n}\n",
            LanguageKind::Js,
        );
        assert_eq!(a, b);
    }

    #[test]
    fn different_code_fingerprints_differ() {
        let a = fingerprint("function add(a, b) { return a + b; }", LanguageKind::Js);
        let b = fingerprint("function sub(a, b) { return a - b; }", LanguageKind::Js);
        assert_ne!(a, b);
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let f = fingerprint("function add(a, b) { return a + b; }", LanguageKind::Js);
        assert_eq!(f.len(), 16);
        assert!(f.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
