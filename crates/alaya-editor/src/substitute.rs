//! Literal `s/pattern/replacement/g` replacement on a single line.
//!
//! Matching is plain text, left to right, non-overlapping: the scanner
//! accumulates characters into a rolling window and, as soon as the window
//! ends with the pattern, emits everything before the match followed by the
//! replacement and starts a fresh window. `"aaa"` with pattern `"aa"` is one
//! occurrence, leaving the trailing `"a"` untouched.
//!
//! The line's cursor column is carried through the rewrite so the caller can
//! keep the cursor on the same piece of text:
//!
//! - before a match: unchanged
//! - inside a match: moved to where the replacement starts
//! - after a match: shifted by the length difference
//! - at end of line: clamped to the new line length

/// Result of rewriting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    pub occurrences: usize,
    pub cursor_col: usize,
}

/// Replace every non-overlapping occurrence of `pattern` in `line`.
///
/// `cursor_col` is a char column in `line`; the returned `cursor_col` is a
/// char column in the rewritten text and never exceeds its length. An empty
/// pattern matches nothing.
#[must_use]
pub fn substitute_line(
    line: &str,
    pattern: &str,
    replacement: &str,
    cursor_col: usize,
) -> Substitution {
    let pattern: Vec<char> = pattern.chars().collect();
    if pattern.is_empty() {
        let len = line.chars().count();
        return Substitution {
            text: line.to_owned(),
            occurrences: 0,
            cursor_col: cursor_col.min(len),
        };
    }
    let replacement_len = replacement.chars().count();

    let mut out = String::with_capacity(line.len());
    let mut out_len = 0;
    let mut window: Vec<char> = Vec::new();
    let mut occurrences = 0;
    let mut mapped: Option<usize> = None;

    for (i, ch) in line.chars().enumerate() {
        if i == cursor_col {
            mapped = Some(out_len + window.len());
        }
        window.push(ch);
        if window.ends_with(&pattern) {
            let keep = window.len() - pattern.len();
            let match_start = out_len + keep;
            if let Some(col) = mapped.as_mut() {
                if *col > match_start {
                    *col = match_start;
                }
            }
            out.extend(&window[..keep]);
            out.push_str(replacement);
            out_len = match_start + replacement_len;
            window.clear();
            occurrences += 1;
        }
    }
    out.extend(&window);
    out_len += window.len();

    let cursor_col = mapped.unwrap_or(cursor_col).min(out_len);
    Substitution {
        text: out,
        occurrences,
        cursor_col,
    }
}
