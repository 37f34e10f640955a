//! Balanced-brace scanner for `${...}` variables
//!
//! Variables nest (`${property:${void}}`), so spans are found by counting
//! braces rather than with a regular expression. A backslash escapes the
//! next character: it neither opens, closes nor separates.

use std::ops::Range;

use crate::{Error, Result};

/// Byte ranges of the top-level variables of `text`, delimiters included
pub fn variable_spans(text: &str) -> Result<Vec<Range<usize>>> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                let end = closing_brace(text, i + 1)?;
                spans.push(i..end);
                i = end;
            }
            _ => i += 1,
        }
    }
    Ok(spans)
}

/// Index just past the `}` matching the `{` at `open`
fn closing_brace(text: &str, open: usize) -> Result<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i + 1);
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(Error::format(text, "unclosed \"${\""))
}

/// Whether `text` is exactly one variable
pub fn is_whole_variable(text: &str) -> bool {
    match variable_spans(text) {
        Ok(spans) => spans.len() == 1 && spans[0] == (0..text.len()),
        Err(_) => false,
    }
}

/// Split the inside of a variable on the `:` separators that are neither
/// escaped nor nested in an inner variable
pub fn split_args(inner: &str) -> Vec<&str> {
    let bytes = inner.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                i += 2;
                continue;
            }
            b'{' => depth += 1,
            b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => {
                parts.push(&inner[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&inner[start..]);
    parts
}

/// Replace each escaped separator `\:` of an argument by a plain `:`
pub fn unescape_separators(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut chars = arg.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(':')) => {
                out.push(':');
                chars.next();
            }
            ('\\', Some(next)) => {
                out.push(c);
                out.push(next);
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// Index of the first unescaped `:` of `text`
pub fn first_separator(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b':' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
