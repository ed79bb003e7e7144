//! Convert HAML templates to ERB.
//!
//! The conversion is a single pass over logical lines. Nesting is
//! reconstructed purely from indentation: every line that opens a scope
//! pushes a frame on a [`BlockStack`], and the frame's closer is written once
//! a later line comes back to (or above) the frame's indentation.
//!
//! ```
//! let erb = haml2erb::convert("%ul\n  %li= item.name\n");
//! assert_eq!(erb, "<ul>\n  <li><%= item.name %></li>\n</ul>\n");
//! ```
//!
//! Embedded Ruby is treated as opaque text. Lines the converter does not
//! understand are copied through; the conversion never fails.

pub mod error;
pub mod generate;
pub mod html;
pub mod parser;
pub mod scope;

use serde::Serialize;
use tracing::debug;

use generate::{dispatch, Dispatch, Output};
use parser::{merge_lines, split_lines, LogicalLine};
use scope::{is_continuation, BlockStack, FilterState};

pub use error::{Error, Result};
pub use generate::Stats;

/// Result of one conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub erb: String,
    pub stats: Stats,
}

/// Convert a HAML document to ERB.
pub fn convert(document: &str) -> String {
    convert_with_stats(document).erb
}

/// Convert a HAML document, also reporting what the converter did.
pub fn convert_with_stats(document: &str) -> Conversion {
    Converter::new(document).run()
}

/// Per-document conversion state. Owns the scope stack, the filter slot
/// and the output buffer for the duration of one call.
pub struct Converter<'a> {
    document: &'a str,
    stack: BlockStack,
    filter: FilterState,
    out: Output,
    passthrough: usize,
}

impl<'a> Converter<'a> {
    pub fn new(document: &'a str) -> Self {
        Self {
            document,
            stack: BlockStack::new(),
            filter: FilterState::new(),
            out: Output::new(),
            passthrough: 0,
        }
    }

    pub fn run(mut self) -> Conversion {
        let physical = split_lines(self.document);
        let lines = merge_lines(&physical);

        for (index, line) in lines.iter().enumerate() {
            self.process(line, next_content_indent(&lines, index));
        }

        self.filter.finish(&mut self.out);
        self.stack.finish(&mut self.out);

        let stats = Stats {
            lines: physical.len(),
            logical_lines: lines.len(),
            frames_opened: self.stack.opened(),
            frames_closed: self.stack.closed(),
            filters_opened: self.filter.opened(),
            passthrough_lines: self.passthrough,
        };
        debug!(?stats, "conversion finished");

        Conversion {
            erb: self.out.finish(),
            stats,
        }
    }

    fn process(&mut self, line: &LogicalLine, next_indent: usize) {
        if self.filter.absorb(line, &mut self.out) {
            return;
        }

        if line.is_blank() {
            self.out.raw(&line.text);
            if line.terminated {
                self.out.raw("\n");
            }
            return;
        }

        let continuation = is_continuation(line.stripped());
        self.stack
            .close_for_indent(line.indent, continuation, &mut self.out);

        let has_children = next_indent > line.indent;
        match dispatch(line, has_children) {
            Dispatch::Rendered { body, closer } => {
                self.out.line(line.indent_str(), &body);
                if let Some(closer) = closer.filter(|_| has_children) {
                    self.stack.push(line.indent, closer);
                }
            }
            Dispatch::FilterStart(kind) => self.filter.start(kind, line.indent, &mut self.out),
            Dispatch::Passthrough => {
                debug!(line = %line.stripped(), "passing line through");
                self.passthrough += 1;
                self.out.line(line.indent_str(), line.stripped());
            }
        }
    }
}

/// Indent of the next non-blank logical line after `index`, or 0 at the end.
fn next_content_indent(lines: &[LogicalLine], index: usize) -> usize {
    lines[index + 1..]
        .iter()
        .find(|line| !line.is_blank())
        .map_or(0, |line| line.indent)
}
