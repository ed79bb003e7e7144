use serde::Serialize;

/// Counters collected during one conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Physical source lines
    pub lines: usize,
    /// Statements after multi-line folding
    pub logical_lines: usize,
    pub frames_opened: usize,
    pub frames_closed: usize,
    pub filters_opened: usize,
    /// Lines copied through because they failed their sub-grammar
    pub passthrough_lines: usize,
}

/// Output buffer that accumulates generated lines
#[derive(Debug, Default)]
pub struct Output {
    lines: Vec<String>,
}

impl Output {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rendered line after the given indentation
    pub fn line(&mut self, indent: &str, body: &str) {
        self.lines.push(format!("{indent}{body}\n"));
    }

    /// Add a rendered line indented by `width` spaces
    pub fn indented(&mut self, width: usize, body: &str) {
        self.lines.push(format!("{}{body}\n", " ".repeat(width)));
    }

    /// Add text exactly as given
    pub fn raw(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    /// Finish and return the generated document
    pub fn finish(self) -> String {
        self.lines.concat()
    }
}
