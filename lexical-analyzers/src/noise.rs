//! Regex/scanner-level noise removal: comments, string/template literals,
//! numeric literals. Deliberately not a real lexer — a best-effort character
//! scanner, matching the "regex-level heuristics" constraint in SPEC_FULL.md
//! §4.A (this engine is not a compiler or semantic analyzer).

use crate::types::LanguageKind;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    LineComment,
    BlockComment,
    Str(char), // active delimiter: ' " or `
}

/// Remove comments, collapse string/template literals to empty delimiters,
/// and collapse numeric literals to `0`. The output is **not** guaranteed to
/// preserve the original byte length or offsets — use [`elide`] when offsets
/// into the original source must be preserved.
pub fn strip_noise(src: &str, lang: LanguageKind) -> String {
    let collapsed = scan(src, lang, true);
    collapse_numbers(&collapsed)
}

/// Comment/string-region elision that preserves the original byte length and
/// newline positions, so byte offsets computed against the result remain
/// valid against the original source. Used internally for brace matching.
pub fn elide(src: &str, lang: LanguageKind) -> String {
    scan(src, lang, false)
}

/// Count `(opens - closes)` of the given delimiter pair after `strip_noise`.
/// Zero means balanced.
pub fn count_balance(src: &str, lang: LanguageKind, open: char, close: char) -> i64 {
    let stripped = strip_noise(src, lang);
    let opens = stripped.chars().filter(|&c| c == open).count() as i64;
    let closes = stripped.chars().filter(|&c| c == close).count() as i64;
    opens - closes
}

fn has_line_comments(lang: LanguageKind) -> bool {
    !matches!(lang, LanguageKind::Other)
}

fn has_block_comments(lang: LanguageKind) -> bool {
    matches!(
        lang,
        LanguageKind::Js | LanguageKind::Ts | LanguageKind::Go | LanguageKind::Rust
    )
}

fn line_comment_token(lang: LanguageKind) -> &'static str {
    match lang {
        LanguageKind::Py => "#",
        _ => "//",
    }
}

fn string_delims(lang: LanguageKind) -> &'static [char] {
    match lang {
        LanguageKind::Js | LanguageKind::Ts => &['\'', '"', '`'],
        _ => &['\'', '"'],
    }
}

/// Shared scanner. When `collapse` is true, comments vanish and string
/// bodies are dropped (delimiters kept, e.g. `"..."` -> `""`). When false,
/// every removed character is replaced by a space so length is preserved.
fn scan(src: &str, lang: LanguageKind, collapse: bool) -> String {
    let chars: Vec<char> = src.chars().collect();
    let n = chars.len();
    let mut out = String::with_capacity(n);
    let mut i = 0usize;
    let mut state = State::Normal;

    let line_tok = line_comment_token(lang);
    let line_tok_chars: Vec<char> = line_tok.chars().collect();
    let delims = string_delims(lang);

    while i < n {
        let c = chars[i];
        match state {
            State::Normal => {
                if has_line_comments(lang) && starts_with_at(&chars, i, &line_tok_chars) {
                    state = State::LineComment;
                    if !collapse {
                        for _ in 0..line_tok_chars.len() {
                            out.push(' ');
                        }
                    }
                    i += line_tok_chars.len();
                    continue;
                }
                if has_block_comments(lang) && c == '/' && chars.get(i + 1) == Some(&'*') {
                    state = State::BlockComment;
                    if !collapse {
                        out.push(' ');
                        out.push(' ');
                    }
                    i += 2;
                    continue;
                }
                if delims.contains(&c) {
                    state = State::Str(c);
                    out.push(c);
                    i += 1;
                    continue;
                }
                out.push(c);
                i += 1;
            }
            State::LineComment => {
                if c == '\n' {
                    state = State::Normal;
                    out.push('\n');
                } else if !collapse {
                    out.push(' ');
                }
                i += 1;
            }
            State::BlockComment => {
                if c == '*' && chars.get(i + 1) == Some(&'/') {
                    state = State::Normal;
                    if !collapse {
                        out.push(' ');
                        out.push(' ');
                    }
                    i += 2;
                    continue;
                }
                if !collapse {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                } else if c == '\n' {
                    out.push('\n');
                }
                i += 1;
            }
            State::Str(open) => {
                if c == '\\' && i + 1 < n {
                    // escaped char: drop both (collapse) or blank both (elide)
                    if !collapse {
                        out.push(' ');
                        out.push(' ');
                    }
                    i += 2;
                    continue;
                }
                if c == open {
                    state = State::Normal;
                    out.push(open);
                    i += 1;
                    continue;
                }
                if !collapse {
                    out.push(if c == '\n' { '\n' } else { ' ' });
                }
                i += 1;
            }
        }
    }
    out
}

fn starts_with_at(chars: &[char], i: usize, pat: &[char]) -> bool {
    if i + pat.len() > chars.len() {
        return false;
    }
    chars[i..i + pat.len()] == *pat
}

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d[\d_]*(?:\.\d[\d_]*)?(?:[eE][+-]?\d+)?\b").unwrap());

fn collapse_numbers(src: &str) -> String {
    NUMBER_RE.replace_all(src, "0").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let src = "// hello\nlet x = 1; /* block\nspans lines */ let y = 2;";
        let out = strip_noise(src, LanguageKind::Js);
        assert!(!out.contains("hello"));
        assert!(!out.contains("block"));
        assert!(out.contains("let x = 0;"));
    }

    #[test]
    fn collapses_strings_to_empty_delimiters() {
        let src = r#"let s = "hello world";"#;
        let out = strip_noise(src, LanguageKind::Js);
        assert!(out.contains("\"\""));
        assert!(!out.contains("hello"));
    }

    #[test]
    fn python_uses_hash_comments_only() {
        let src = "# comment\nx = 1\n";
        let out = strip_noise(src, LanguageKind::Py);
        assert!(!out.contains("comment"));
        assert!(out.contains("x = 0"));
    }

    #[test]
    fn count_balance_is_zero_for_balanced_braces() {
        let src = "fn f() { if (a) { return 0; } }";
        assert_eq!(count_balance(src, LanguageKind::Rust, '{', '}'), 0);
    }

    #[test]
    fn count_balance_ignores_braces_in_strings_and_comments() {
        let src = r#"let s = "{"; // {"#;
        assert_eq!(count_balance(src, LanguageKind::Js, '{', '}'), 0);
    }

    #[test]
    fn elide_preserves_length() {
        let src = "let s = \"hi\"; // note\nlet y = 1;";
        let elided = elide(src, LanguageKind::Js);
        assert_eq!(elided.chars().count(), src.chars().count());
    }
}
