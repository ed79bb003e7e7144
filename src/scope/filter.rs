use tracing::debug;

use crate::generate::Output;
use crate::parser::LogicalLine;

/// Filters whose body is copied through between block delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `:ruby`, a block of statements
    Ruby,
}

impl FilterKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ruby" => Some(FilterKind::Ruby),
            _ => None,
        }
    }

    pub fn opening_delimiter(&self) -> &'static str {
        match self {
            FilterKind::Ruby => "<%",
        }
    }

    pub fn closing_delimiter(&self) -> &'static str {
        match self {
            FilterKind::Ruby => "%>",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveFilter {
    kind: FilterKind,
    opening_indent: usize,
}

/// At most one filter is active at a time.
#[derive(Debug, Default)]
pub struct FilterState {
    active: Option<ActiveFilter>,
    opened: usize,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn start(&mut self, kind: FilterKind, opening_indent: usize, out: &mut Output) {
        debug!(?kind, indent = opening_indent, "filter start");
        out.indented(opening_indent, kind.opening_delimiter());
        self.active = Some(ActiveFilter {
            kind,
            opening_indent,
        });
        self.opened += 1;
    }

    /// Copy `line` into the active filter body.
    ///
    /// Returns `false` when no filter is active or the line is not part of
    /// the body; in the latter case the filter is closed first and the
    /// caller dispatches the line as usual.
    pub fn absorb(&mut self, line: &LogicalLine, out: &mut Output) -> bool {
        let Some(filter) = self.active else {
            return false;
        };

        if line.is_blank() || line.indent > filter.opening_indent {
            out.raw(&line.text);
            out.raw("\n");
            return true;
        }

        self.finish(out);
        false
    }

    /// Close the active filter, if any.
    pub fn finish(&mut self, out: &mut Output) {
        if let Some(filter) = self.active.take() {
            debug!(kind = ?filter.kind, "filter close");
            out.indented(filter.opening_indent, filter.kind.closing_delimiter());
        }
    }

    pub fn opened(&self) -> usize {
        self.opened
    }
}
