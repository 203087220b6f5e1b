//! Readability sub-score: weighted average of comment quality, nesting,
//! line quality, and naming (SPEC_FULL.md §4.B).

use lexical_analyzers::{LanguageKind, NamingConvention, elide};
use regex::Regex;
use std::sync::LazyLock;

const W_COMMENT: f64 = 0.30;
const W_NESTING: f64 = 0.25;
const W_LINE: f64 = 0.25;
const W_NAMING: f64 = 0.20;

const EXEMPT_SHORT_NAMES: [&str; 7] = ["i", "j", "k", "n", "x", "y", "_"];

pub fn readability_score(code: &str, language: LanguageKind) -> f64 {
    W_COMMENT * comment_quality(code, language)
        + W_NESTING * nesting_score(code, language)
        + W_LINE * line_quality(code)
        + W_NAMING * naming_score(code, language)
}

fn comment_quality(code: &str, language: LanguageKind) -> f64 {
    let line_tok = if language == LanguageKind::Py { "#" } else { "//" };
    let lines: Vec<&str> = code.lines().collect();
    if lines.is_empty() {
        return 0.0;
    }
    let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count().max(1);
    let commented = lines
        .iter()
        .filter(|l| {
            let t = l.trim_start();
            t.starts_with(line_tok) || t.starts_with("/*") || t.starts_with('*') || l.contains(line_tok)
        })
        .count();
    let ratio = commented as f64 / non_blank as f64;
    // Target roughly 15% comment density; anything at or above is full credit.
    (ratio / 0.15).min(1.0)
}

fn nesting_score(code: &str, language: LanguageKind) -> f64 {
    let elided = elide(code, language);
    let mut depth = 0i64;
    let mut max_depth = 0i64;
    for c in elided.chars() {
        match c {
            '{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            '}' => depth -= 1,
            _ => {}
        }
    }
    if max_depth <= 2 {
        1.0
    } else if max_depth >= 8 {
        0.0
    } else {
        1.0 - (max_depth - 2) as f64 / 6.0
    }
}

fn line_quality(code: &str) -> f64 {
    let lines: Vec<&str> = code.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return 1.0;
    }
    let avg_len = lines.iter().map(|l| l.chars().count()).sum::<usize>() as f64 / lines.len() as f64;
    let fn_len = lines.len();

    let avg_penalty = if avg_len > 100.0 {
        ((avg_len - 100.0) / 100.0).min(0.5)
    } else {
        0.0
    };
    let len_penalty = if fn_len > 60 {
        ((fn_len - 60) as f64 / 60.0).min(0.5)
    } else {
        0.0
    };
    (1.0 - avg_penalty - len_penalty).clamp(0.0, 1.0)
}

static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());
static SNAKE_OK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$|^[A-Z][A-Z0-9_]*$").unwrap());
static CAMEL_OK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$|^[A-Z][a-zA-Z0-9]*$").unwrap());

fn naming_score(code: &str, language: LanguageKind) -> f64 {
    let convention = language.naming_convention();
    let idents: Vec<&str> = IDENT_RE.find_iter(code).map(|m| m.as_str()).collect();
    if idents.is_empty() {
        return 1.0;
    }
    let mut bad = 0usize;
    for id in &idents {
        if id.chars().count() == 1 && !EXEMPT_SHORT_NAMES.contains(id) {
            bad += 1;
            continue;
        }
        let ok = match convention {
            NamingConvention::Snake => SNAKE_OK.is_match(id),
            NamingConvention::Camel => CAMEL_OK.is_match(id),
            NamingConvention::Unspecified => true,
        };
        if !ok {
            bad += 1;
        }
    }
    (1.0 - bad as f64 / idents.len() as f64).clamp(0.0, 1.0)
}
