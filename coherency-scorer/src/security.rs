//! Security sub-score and the covenant check, sharing one anti-pattern
//! table (SPEC_FULL.md §4.B). The covenant is a hard boolean gate used by
//! submit acceptance and community sharing; the security sub-score is a
//! graded deduction over the same table.

use regex::Regex;
use std::sync::LazyLock;

pub struct AntiPatternRule {
    pub id: &'static str,
    pub reason: &'static str,
    pub severity: f64,
    pub critical: bool,
    regex: LazyLock<Regex>,
}

impl AntiPatternRule {
    fn is_match(&self, code: &str) -> bool {
        self.regex.is_match(code)
    }
}

macro_rules! rule {
    ($id:literal, $reason:literal, $severity:expr, $critical:expr, $pat:literal) => {
        AntiPatternRule {
            id: $id,
            reason: $reason,
            severity: $severity,
            critical: $critical,
            regex: LazyLock::new(|| Regex::new($pat).unwrap()),
        }
    };
}

pub static RULES: [AntiPatternRule; 5] = [
    rule!(
        "dynamic-eval",
        "eval/exec of a dynamic string",
        1.0,
        true,
        r"\b(?:eval|exec)\s*\("
    ),
    rule!(
        "shell-command-substitution",
        "shell-style command substitution of user input",
        0.6,
        false,
        r"(?:child_process\.exec|os\.system|subprocess\.call|subprocess\.Popen)\s*\("
    ),
    rule!(
        "hardcoded-secret",
        "hardcoded high-entropy secret assigned to a variable",
        1.0,
        true,
        r#"[A-Za-z_]\w*\s*[:=]\s*["'][A-Za-z0-9+/_-]{20,}["']|sk_live_|sk_test_|AKIA[0-9A-Z]{16}|ghp_[A-Za-z0-9_]{20,}"#
    ),
    rule!(
        "sql-string-concatenation",
        "SQL statement built via string concatenation",
        0.4,
        false,
        r#"["'](?:SELECT|INSERT|UPDATE|DELETE)\b[^"']*["']\s*\+"#
    ),
    rule!(
        "prototype-pollution",
        "assignment into __proto__ or a shared prototype",
        0.5,
        false,
        r"__proto__\s*(?:\[|=|\.)|\.prototype\s*="
    ),
];

pub struct CovenantResult {
    pub sealed: bool,
    pub violations: Vec<&'static str>,
}

/// Hard lexical rejection predicate, evaluated independently of the
/// weighted sub-scores (SPEC_FULL.md §4.B "Covenant check").
pub fn covenant_check(code: &str) -> CovenantResult {
    let violations: Vec<&'static str> = RULES
        .iter()
        .filter(|r| r.critical && r.is_match(code))
        .map(|r| r.reason)
        .collect();
    CovenantResult {
        sealed: violations.is_empty(),
        violations,
    }
}

/// Graded security sub-score: start at 1.0, deduct each matched rule's
/// severity; any critical match forces the score to 0.
pub fn security_score(code: &str) -> f64 {
    let mut any_critical = false;
    let mut deduction = 0.0;
    for r in RULES.iter() {
        if r.is_match(code) {
            deduction += r.severity;
            if r.critical {
                any_critical = true;
            }
        }
    }
    if any_critical {
        return 0.0;
    }
    (1.0 - deduction).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_code_scores_one() {
        assert_eq!(security_score("function add(a, b) { return a + b; }"), 1.0);
    }

    #[test]
    fn hardcoded_secret_fails_covenant() {
        let code = "const k='sk_live_' + 'a'.repeat(40)";
        let res = covenant_check(code);
        assert!(!res.sealed);
        assert!(res.violations.contains(&"hardcoded high-entropy secret assigned to a variable"));
    }

    #[test]
    fn eval_is_critical() {
        let code = "function run(input) { return eval(input); }";
        let res = covenant_check(code);
        assert!(!res.sealed);
        assert_eq!(security_score(code), 0.0);
    }

    #[test]
    fn non_critical_rule_only_deducts() {
        let code = r#"let q = "SELECT * FROM users WHERE id=" + id;"#;
        assert!(covenant_check(code).sealed);
        assert!(security_score(code) < 1.0);
    }
}
