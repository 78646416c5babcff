//! Locating query calls inside statement text

use regex::Regex;
use std::sync::OnceLock;

fn call_head() -> &'static Regex {
    static HEAD: OnceLock<Regex> = OnceLock::new();
    HEAD.get_or_init(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid call regex"))
}

/// A call to one of the requested functions, located by byte offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Call<'a> {
    pub name: &'a str,
    /// Offset of the function name
    pub start: usize,
    /// Offset one past the closing parenthesis
    pub end: usize,
    /// Argument text between the parentheses
    pub args: &'a str,
}

impl<'a> Call<'a> {
    pub fn text(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Offset of the parenthesis closing the one at `open`, skipping string literals
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text[open..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return (c == ')').then_some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Outermost calls to any of `names`, left to right.
///
/// Calls nested inside a matched call are not reported separately; attribute
/// calls such as `x.len()` are ignored.
pub(crate) fn find_calls<'a>(text: &'a str, names: &[&str]) -> Vec<Call<'a>> {
    let mut calls = Vec::new();
    let mut pos = 0;

    while let Some(captures) = call_head().captures_at(text, pos) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            break;
        };
        let attribute = text[..whole.start()].ends_with('.');
        if attribute || !names.contains(&name.as_str()) {
            pos = whole.end();
            continue;
        }

        let open = whole.end() - 1;
        match matching_paren(text, open) {
            Some(close) => {
                calls.push(Call {
                    name: name.as_str(),
                    start: whole.start(),
                    end: close + 1,
                    args: &text[open + 1..close],
                });
                pos = close + 1;
            }
            None => pos = whole.end(),
        }
    }
    calls
}

/// Replace each call with `replace(call)`, leaving the rest of the text intact
pub(crate) fn rewrite_calls<F>(text: &str, names: &[&str], mut replace: F) -> String
where
    F: FnMut(&Call<'_>) -> String,
{
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for call in find_calls(text, names) {
        out.push_str(&text[last..call.start]);
        out.push_str(&replace(&call));
        last = call.end;
    }
    out.push_str(&text[last..]);
    out
}
