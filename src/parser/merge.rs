//! Folds multi-line statements into logical lines.
//!
//! Two constructs span physical lines in practice:
//!
//! ```text
//! .alert{                          = form.input :value,
//!   class: class_name,               collection: options,
//!   'data-controller': 'alert',      include_blank: '----'
//! }
//!   test
//! ```
//!
//! The first becomes `.alert{ class: class_name, 'data-controller': 'alert' } test`,
//! the second `= form.input :value, collection: options, include_blank: '----'`.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::trace;

use super::lines::{LineKind, LogicalLine, PhysicalLine};

lazy_static! {
    // Element or class/id shorthand, optional markup without output or other
    // braces, then an opening brace that ends the line.
    static ref BRACE_OPENER: Regex =
        Regex::new(r"^(?:%[A-Za-z0-9_-]+|[.#][A-Za-z_-][A-Za-z0-9_-]*)[^{=]*\{\s*$").unwrap();
}

/// Fold physical lines into logical lines.
pub fn merge_lines(lines: &[PhysicalLine<'_>]) -> Vec<LogicalLine> {
    let mut result = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = &lines[i];
        let stripped = line.stripped();

        if BRACE_OPENER.is_match(stripped) {
            if let Some((merged, next)) = merge_brace_block(lines, i) {
                trace!(line = i + 1, span = merged.span, "merged attribute block");
                result.push(merged);
                i = next;
                continue;
            }
        }

        if stripped.starts_with('=') && stripped.ends_with(',') {
            let (merged, next) = merge_comma_continuation(lines, i);
            trace!(line = i + 1, span = merged.span, "merged continued output");
            result.push(merged);
            i = next;
            continue;
        }

        result.push(LogicalLine::single(line));
        i += 1;
    }

    result
}

/// Collect a `{`-opened attribute block up to its lone `}` line.
///
/// Returns the merged line and the index of the first line after it, or
/// `None` when the block is never closed or an attribute line is not
/// indented deeper than the opener.
fn merge_brace_block(lines: &[PhysicalLine<'_>], start: usize) -> Option<(LogicalLine, usize)> {
    let base = &lines[start];
    let stripped = base.stripped();
    let brace = stripped.rfind('{')?;
    let element_part = stripped[..brace].trim_end();
    let base_indent = &base.text[..base.text.len() - base.text.trim_start().len()];

    let mut fragments: Vec<&str> = Vec::new();
    let mut i = start + 1;

    while i < lines.len() {
        let line = &lines[i];
        if line.is_blank() {
            i += 1;
            continue;
        }

        let attr = line.stripped();
        if attr == "}" {
            let (content, next) = collect_trailing_content(lines, i + 1, base.indent);
            let mut merged = format!("{base_indent}{element_part}{{ {} }}", fragments.join(", "));
            if !content.is_empty() {
                merged.push(' ');
                merged.push_str(&content.join(" "));
            }
            return Some((LogicalLine::merged(merged, next - start), next));
        }

        if line.indent <= base.indent {
            return None;
        }

        let fragment = attr.strip_suffix(',').unwrap_or(attr).trim_end();
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
        i += 1;
    }

    None
}

/// Plain-text lines after the closing brace, all at one indent deeper than
/// the opener, become the element's inline content.
fn collect_trailing_content<'a>(
    lines: &[PhysicalLine<'a>],
    from: usize,
    base_indent: usize,
) -> (Vec<&'a str>, usize) {
    let mut content = Vec::new();
    let mut content_indent = None;
    let mut next = from;
    let mut i = from;

    while i < lines.len() {
        let line = &lines[i];
        if line.is_blank() {
            i += 1;
            continue;
        }
        if line.indent <= base_indent || LineKind::classify(line.stripped()) != LineKind::Text {
            break;
        }
        if *content_indent.get_or_insert(line.indent) != line.indent {
            break;
        }

        content.push(line.stripped());
        i += 1;
        next = i;
    }

    (content, next)
}

/// Absorb deeper lines into an `=` statement that ends with a comma.
fn merge_comma_continuation(lines: &[PhysicalLine<'_>], start: usize) -> (LogicalLine, usize) {
    let base = &lines[start];
    let mut merged = base.text.trim_end().to_string();
    let mut next = start + 1;
    let mut i = start + 1;

    while i < lines.len() {
        let line = &lines[i];
        if line.is_blank() {
            i += 1;
            continue;
        }
        if line.indent <= base.indent {
            break;
        }

        merged.push(' ');
        merged.push_str(line.stripped());
        i += 1;
        next = i;
    }

    (LogicalLine::merged(merged, next - start), next)
}
