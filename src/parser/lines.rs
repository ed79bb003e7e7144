use super::scan::leading_indent;

/// One raw line of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalLine<'a> {
    /// Line text without its terminator (`\n` or `\r\n`)
    pub text: &'a str,
    /// Leading whitespace width
    pub indent: usize,
    /// Whether the line ended with a newline in the source
    pub terminated: bool,
}

impl<'a> PhysicalLine<'a> {
    pub fn new(raw: &'a str) -> Self {
        let (text, terminated) = match raw.strip_suffix('\n') {
            Some(body) => (body.strip_suffix('\r').unwrap_or(body), true),
            None => (raw, false),
        };
        Self {
            text,
            indent: leading_indent(text),
            terminated,
        }
    }

    /// Content with surrounding whitespace removed.
    pub fn stripped(&self) -> &'a str {
        self.text.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.stripped().is_empty()
    }
}

/// Split a document into physical lines, keeping track of terminators.
pub fn split_lines(document: &str) -> Vec<PhysicalLine<'_>> {
    document.split_inclusive('\n').map(PhysicalLine::new).collect()
}

/// One statement of the source notation, possibly folded from several
/// physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Full text including the leading indentation of the first line
    pub text: String,
    /// Indent of the first constituent line
    pub indent: usize,
    /// Number of physical lines folded into this one
    pub span: usize,
    /// Whether the last constituent line ended with a newline
    pub terminated: bool,
}

impl LogicalLine {
    pub fn single(line: &PhysicalLine<'_>) -> Self {
        Self {
            text: line.text.to_string(),
            indent: line.indent,
            span: 1,
            terminated: line.terminated,
        }
    }

    pub fn merged(text: String, span: usize) -> Self {
        Self {
            indent: leading_indent(&text),
            text,
            span,
            terminated: true,
        }
    }

    pub fn stripped(&self) -> &str {
        self.text.trim()
    }

    /// The leading whitespace exactly as written in the source.
    pub fn indent_str(&self) -> &str {
        let end = self.text.len() - self.text.trim_start_matches([' ', '\t']).len();
        &self.text[..end]
    }

    pub fn is_blank(&self) -> bool {
        self.stripped().is_empty()
    }

    pub fn kind(&self) -> LineKind {
        LineKind::classify(self.stripped())
    }
}

/// Category of a line, selected by its leading sigil.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty/whitespace only
    Blank,
    /// `!!!`
    Doctype,
    /// `-#` comment that never reaches the output as markup
    HamlComment,
    /// `%tag`
    Element,
    /// `.class` on the generic container
    ClassShorthand,
    /// `#id` on the generic container
    IdShorthand,
    /// `=` expression output
    Output,
    /// `-` code statement
    Code,
    /// `&=` escaped output
    EscapedOutput,
    /// `!=` unescaped output
    UnescapedOutput,
    /// `/` HTML comment
    HtmlComment,
    /// `:name` filter introducer
    Filter,
    /// Anything else
    Text,
}

impl LineKind {
    /// Classify stripped line content. The order of the checks is the
    /// dispatch precedence: the first matching sigil wins.
    pub fn classify(stripped: &str) -> Self {
        if stripped.is_empty() {
            LineKind::Blank
        } else if stripped.starts_with("!!!") {
            LineKind::Doctype
        } else if stripped.starts_with("-#") {
            LineKind::HamlComment
        } else if stripped.starts_with('%') {
            LineKind::Element
        } else if stripped.starts_with('.') {
            LineKind::ClassShorthand
        } else if stripped.starts_with('#') && !stripped.starts_with("#{") {
            LineKind::IdShorthand
        } else if stripped.starts_with('=') {
            LineKind::Output
        } else if stripped.starts_with('-') {
            LineKind::Code
        } else if stripped.starts_with("&=") {
            LineKind::EscapedOutput
        } else if stripped.starts_with("!=") {
            LineKind::UnescapedOutput
        } else if stripped.starts_with('/') {
            LineKind::HtmlComment
        } else if stripped.starts_with(':') {
            LineKind::Filter
        } else {
            LineKind::Text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keeps_terminators() {
        let lines = split_lines("%div\n  %p Hi\r\nlast");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].text, "%div");
        assert!(lines[0].terminated);
        assert_eq!(lines[1].text, "  %p Hi");
        assert_eq!(lines[1].indent, 2);
        assert_eq!(lines[2].text, "last");
        assert!(!lines[2].terminated);
    }

    #[test]
    fn test_blank_line() {
        let lines = split_lines("\n   \n");
        assert!(lines.iter().all(PhysicalLine::is_blank));
    }

    #[test]
    fn test_indent_str() {
        let line = LogicalLine::single(&PhysicalLine::new("\t  %p"));
        assert_eq!(line.indent_str(), "\t  ");
        assert_eq!(line.indent, 3);
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(LineKind::classify("!!!"), LineKind::Doctype);
        assert_eq!(LineKind::classify("-# note"), LineKind::HamlComment);
        assert_eq!(LineKind::classify("- if x"), LineKind::Code);
        assert_eq!(LineKind::classify("%p"), LineKind::Element);
        assert_eq!(LineKind::classify(".box"), LineKind::ClassShorthand);
        assert_eq!(LineKind::classify("#main"), LineKind::IdShorthand);
        assert_eq!(LineKind::classify("#{name}"), LineKind::Text);
        assert_eq!(LineKind::classify("= x"), LineKind::Output);
        assert_eq!(LineKind::classify("&= x"), LineKind::EscapedOutput);
        assert_eq!(LineKind::classify("!= x"), LineKind::UnescapedOutput);
        assert_eq!(LineKind::classify("/ note"), LineKind::HtmlComment);
        assert_eq!(LineKind::classify(":ruby"), LineKind::Filter);
        assert_eq!(LineKind::classify("Hello"), LineKind::Text);
        assert_eq!(LineKind::classify(""), LineKind::Blank);
    }
}
