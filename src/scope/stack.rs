//! Block Stack Manager: turns indentation decreases into closing markers.
//!
//! ```text
//! - if user              <% if user %>
//!   %p Found               <p>Found</p>
//! - else                 <% else %>
//!   %p Not found           <p>Not found</p>
//!                        <% end %>
//! ```
//!
//! The `else` line closes nothing at its own indent, so the `if` frame
//! survives until the drain at the end.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::generate::Output;

/// Closer for blocks opened by embedded code
pub const END_MARKER: &str = "<% end %>";

const BLOCK_KEYWORDS: &[&str] = &["if", "unless", "case", "while", "until", "for", "begin"];
const CONTINUATION_KEYWORDS: &[&str] = &["else", "elsif", "when", "in", "rescue", "ensure"];

lazy_static! {
    static ref DO_BLOCK: Regex = Regex::new(r"(?:^|\s)do(?:\s*\|[^|]*\|)?\s*$").unwrap();
}

/// One open scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFrame {
    pub opening_indent: usize,
    pub closing_marker: String,
}

/// Open scopes, innermost last. Opening indents never decrease towards the top.
#[derive(Debug, Default)]
pub struct BlockStack {
    frames: Vec<BlockFrame>,
    opened: usize,
    closed: usize,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, opening_indent: usize, closing_marker: impl Into<String>) {
        debug_assert!(
            self.frames
                .last()
                .is_none_or(|top| top.opening_indent <= opening_indent),
            "frame indents must not decrease"
        );
        let frame = BlockFrame {
            opening_indent,
            closing_marker: closing_marker.into(),
        };
        debug!(indent = opening_indent, closer = %frame.closing_marker, "push frame");
        self.frames.push(frame);
        self.opened += 1;
    }

    /// Pop every frame the line at `indent` ends and write its closer.
    ///
    /// A continuation line (`- else`, `- when ...`) only ends frames that are
    /// strictly deeper than itself.
    pub fn close_for_indent(&mut self, indent: usize, continuation: bool, out: &mut Output) {
        while let Some(top) = self.frames.last() {
            let ends = if continuation {
                top.opening_indent > indent
            } else {
                top.opening_indent >= indent
            };
            if !ends {
                break;
            }
            self.pop(out);
        }
    }

    /// Close everything still open. Called once after the last line.
    pub fn finish(&mut self, out: &mut Output) {
        while !self.frames.is_empty() {
            self.pop(out);
        }
    }

    fn pop(&mut self, out: &mut Output) {
        if let Some(frame) = self.frames.pop() {
            debug!(indent = frame.opening_indent, closer = %frame.closing_marker, "pop frame");
            out.indented(frame.opening_indent, &frame.closing_marker);
            self.closed += 1;
        }
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn opened(&self) -> usize {
        self.opened
    }

    pub fn closed(&self) -> usize {
        self.closed
    }
}

fn starts_with_keyword(code: &str, keywords: &[&str]) -> bool {
    let word = code
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .next()
        .unwrap_or("");
    keywords.contains(&word)
}

/// Whether a stripped `-` line continues an enclosing construct.
pub fn is_continuation(stripped: &str) -> bool {
    match stripped.strip_prefix('-') {
        Some(code) if !code.starts_with('#') => {
            starts_with_keyword(code.trim_start(), CONTINUATION_KEYWORDS)
        }
        _ => false,
    }
}

/// Whether `code` ends with a `do` or `do |args|` block opener.
pub fn has_do_block(code: &str) -> bool {
    DO_BLOCK.is_match(code)
}

/// Whether statement code opens a block that needs `<% end %>`.
pub fn opens_block(code: &str) -> bool {
    let code = code.trim();
    starts_with_keyword(code, BLOCK_KEYWORDS) || has_do_block(code)
}
