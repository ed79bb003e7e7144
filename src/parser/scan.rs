//! Quote-aware scanning primitives shared by the line merger, the tag parser
//! and the attribute parser.
//!
//! All positions are byte offsets. The only characters these scanners care
//! about (quotes, brackets, commas, `#`) are ASCII, so byte offsets found
//! while walking `char_indices` are always valid slice boundaries.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref INTERPOLATION: Regex = Regex::new(r"\\?#\{([^}]+)\}").unwrap();
}

/// Content of a balanced `{...}` group and whatever follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balanced<'a> {
    /// Text between the outer braces (delimiters excluded)
    pub content: &'a str,
    /// Text after the closing brace
    pub remaining: &'a str,
}

/// Width of the leading whitespace (spaces and tabs) of a line.
pub fn leading_indent(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Find the byte offset of the delimiter that closes the first `open` in `text`.
///
/// Delimiters inside single- or double-quoted regions are ignored. A quote
/// preceded by a backslash does not end the quoted region.
pub fn find_closing_delimiter(text: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q && prev != Some('\\') {
                    quote = None;
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                } else if c == open {
                    depth += 1;
                } else if c == close && depth > 0 {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
            }
        }
        prev = Some(c);
    }

    None
}

/// Split a leading `{...}` group off `text` (leading whitespace ignored).
///
/// Returns `None` when the text does not start with `{` or the brace is
/// never closed.
pub fn extract_balanced_braces(text: &str) -> Option<Balanced<'_>> {
    let text = text.trim_start();
    if !text.starts_with('{') {
        return None;
    }

    let close = find_closing_delimiter(text, '{', '}')?;
    Some(Balanced {
        content: &text[1..close],
        remaining: &text[close + 1..],
    })
}

/// Split `text` on `delimiter`, ignoring delimiters inside quotes or inside
/// any `()`, `[]` or `{}` nesting.
///
/// A trailing empty part is not returned, so `"a, b,"` yields two parts.
pub fn smart_split(text: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        match quote {
            Some(q) => {
                if c == q && prev != Some('\\') {
                    quote = None;
                }
            }
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = (depth - 1).max(0),
                _ if c == delimiter && depth == 0 => {
                    parts.push(&text[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
        prev = Some(c);
    }

    if start < text.len() {
        parts.push(&text[start..]);
    }
    parts
}

/// Whether byte offset `position` of `code` falls inside a quoted literal.
pub fn inside_string_literal(code: &str, position: usize) -> bool {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in code[..position.min(code.len())].chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        match quote {
            Some(q) if c == q => quote = None,
            None if c == '"' || c == '\'' => quote = Some(c),
            _ => {}
        }
    }

    quote.is_some()
}

/// Byte offset of the first ` #` comment trailer that is outside every
/// quoted literal and is not an interpolation opener.
pub fn find_comment_trailer(code: &str) -> Option<usize> {
    code.match_indices(" #")
        .map(|(i, _)| i)
        .find(|&i| !code[i + 2..].starts_with('{') && !inside_string_literal(code, i))
}

/// Rewrite `#{expr}` interpolation markers as `<%= expr %>`.
///
/// A backslash-escaped marker (`\#{expr}`) loses the backslash and is kept
/// as literal text.
pub fn rewrite_interpolation(content: &str) -> String {
    INTERPOLATION
        .replace_all(content, |caps: &Captures| {
            let whole = &caps[0];
            match whole.strip_prefix('\\') {
                Some(literal) => literal.to_string(),
                None => format!("<%= {} %>", &caps[1]),
            }
        })
        .into_owned()
}
