//! Top-level function span extraction, per SPEC_FULL.md §4.A.
//!
//! Brace languages: locate the signature via regex, walk forward (on an
//! offset-preserving elided copy) to the opening brace, then depth-count to
//! the matching close. Python: locate `def`, then include subsequent lines
//! more indented than the signature (or blank) until the first dedent.

use crate::errors::{Error, Result};
use crate::noise::elide;
use crate::types::{FunctionSpan, LanguageKind, is_denied};
use regex::Regex;
use std::sync::LazyLock;

static SIG_JS_TS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunction\s*\*?\s+([A-Za-z_$][\w$]*)\s*\(").unwrap());
static SIG_GO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfunc\s*(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*\(").unwrap());
static SIG_RUST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfn\s+([A-Za-z_]\w*)\s*(?:<[^>]*>)?\s*\(").unwrap());
static SIG_PY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)def\s+([A-Za-z_]\w*)\s*\(").unwrap());

/// Find all top-level function definitions in `src`.
pub fn extract_function_spans(src: &str, lang: LanguageKind) -> Result<Vec<FunctionSpan>> {
    if lang == LanguageKind::Py {
        return extract_python(src);
    }
    let sig = match lang {
        LanguageKind::Js | LanguageKind::Ts => &*SIG_JS_TS,
        LanguageKind::Go => &*SIG_GO,
        LanguageKind::Rust => &*SIG_RUST,
        LanguageKind::Other => return Ok(Vec::new()),
        LanguageKind::Py => unreachable!(),
    };
    extract_brace_language(src, lang, sig)
}

fn extract_brace_language(src: &str, lang: LanguageKind, sig: &Regex) -> Result<Vec<FunctionSpan>> {
    let elided = elide(src, lang);
    let bytes = elided.as_bytes();
    let mut out = Vec::new();

    for caps in sig.captures_iter(&elided) {
        let whole = caps.get(0).unwrap();
        let name = caps.get(1).unwrap().as_str().to_string();
        if is_denied(&name, lang) {
            continue;
        }
        let start = whole.start();

        // Skip forward over the parameter list (paren-depth aware) to find
        // the opening brace. If it never arrives before a `;` or EOF, this
        // is a declaration without a body (e.g. a trait/interface method) —
        // not an error, just not emitted.
        let mut i = whole.end();
        let mut paren_depth = 1i64; // whole ends right after the opening '('
        while i < bytes.len() && paren_depth > 0 {
            match bytes[i] {
                b'(' => paren_depth += 1,
                b')' => paren_depth -= 1,
                _ => {}
            }
            i += 1;
        }
        if paren_depth != 0 {
            return Err(Error::MalformedSpan(start));
        }

        // Skip whitespace/return-type noise until '{' or a statement-ending
        // ';'/newline-without-brace.
        while i < bytes.len() && bytes[i] != b'{' && bytes[i] != b';' {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'{' {
            continue; // declaration only, no body
        }

        let brace_start = i;
        let mut depth = 0i64;
        let mut end = None;
        while i < bytes.len() {
            match bytes[i] {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
            i += 1;
        }
        let end = match end {
            Some(e) => e,
            None => return Err(Error::MalformedSpan(brace_start)),
        };

        out.push(FunctionSpan { name, start, end });
    }
    Ok(out)
}

fn extract_python(src: &str) -> Result<Vec<FunctionSpan>> {
    let lines: Vec<&str> = src.split_inclusive('\n').collect();
    let mut offsets = Vec::with_capacity(lines.len() + 1);
    let mut acc = 0usize;
    for l in &lines {
        offsets.push(acc);
        acc += l.len();
    }
    offsets.push(acc);

    let mut out = Vec::new();
    let mut idx = 0usize;
    while idx < lines.len() {
        let line = lines[idx];
        if let Some(caps) = SIG_PY.captures(line.trim_end_matches('\n')) {
            let indent = caps.get(1).unwrap().as_str().len();
            let name = caps.get(2).unwrap().as_str().to_string();
            if is_denied(&name, LanguageKind::Py) {
                idx += 1;
                continue;
            }
            let start = offsets[idx];
            let mut end_line = idx + 1;
            while end_line < lines.len() {
                let l = lines[end_line];
                let body = l.trim_end_matches('\n');
                if body.trim().is_empty() {
                    end_line += 1;
                    continue;
                }
                let this_indent = body.len() - body.trim_start().len();
                if this_indent > indent {
                    end_line += 1;
                } else {
                    break;
                }
            }
            let end = offsets[end_line];
            out.push(FunctionSpan { name, start, end });
            idx = end_line;
            continue;
        }
        idx += 1;
    }
    Ok(out)
}
