//! Functions for measuring, adding and removing the indentation shared by
//! the lines of a block of text.
//!
//! An *empty* line has zero characters and is never indented. A line made
//! of whitespace only is not empty.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static LINE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[^\n]").unwrap());

/// Inserts `indent` at the start of every non-empty line, the first one
/// included.
///
/// # Examples
///
/// ```
/// assert_eq!(hypertag::add_indent("a\n\nb", "  "), "  a\n\n  b");
/// ```
pub fn add_indent<'a>(text: &'a str, indent: &str) -> Cow<'a, str> {
    if indent.is_empty() {
        return Cow::Borrowed(text);
    }
    LINE_START.replace_all(text, |caps: &Captures<'_>| format!("{indent}{}", &caps[0]))
}

/// Returns the longest whitespace prefix shared by every non-empty line.
///
/// Lines are compared column by column; the scan stops at the first column
/// that is not whitespace or differs between lines. When every non-empty
/// line is a prefix of the others the shortest line is returned.
///
/// # Examples
///
/// ```
/// assert_eq!(hypertag::get_indent("  a\n    b\n  c"), "  ");
/// ```
pub fn get_indent(text: &str) -> &str {
    let mut lines = text.split('\n').filter(|line| !line.is_empty());
    let first = match lines.next() {
        Some(first) => first,
        None => return "",
    };

    let mut len = first
        .bytes()
        .take_while(|b| is_whitespace(*b))
        .count();
    for line in lines {
        len = first.as_bytes()[..len]
            .iter()
            .zip(line.as_bytes())
            .take_while(|(a, b)| a == b)
            .count();
        if len == 0 {
            break;
        }
    }
    &first[..len]
}

/// Removes `indent` from the start of every line that begins with it.
pub fn del_indent<'a>(text: &'a str, indent: &str) -> Cow<'a, str> {
    if indent.is_empty() {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        out.push_str(line.strip_prefix(indent).unwrap_or(line));
    }
    Cow::Owned(out)
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}
