//! Line Dispatcher: one converter per leading sigil.

use tracing::trace;

use super::tag::build_tag;
use crate::parser::scan::{find_comment_trailer, rewrite_interpolation};
use crate::parser::{parse_tag, LineKind, LogicalLine};
use crate::scope::{has_do_block, is_continuation, opens_block, FilterKind, END_MARKER};

/// What one logical line turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Output line body, written at the line's own indentation
    Rendered {
        body: String,
        /// Marker owed if the line opened a scope and has children
        closer: Option<String>,
    },
    /// Start of a filter body
    FilterStart(FilterKind),
    /// The line failed its sub-grammar and is copied through
    Passthrough,
}

impl Dispatch {
    fn line(body: String) -> Self {
        Dispatch::Rendered { body, closer: None }
    }
}

/// Convert one non-filter logical line.
pub fn dispatch(line: &LogicalLine, has_children: bool) -> Dispatch {
    let stripped = line.stripped();
    let kind = line.kind();
    trace!(?kind, indent = line.indent, has_children, "dispatch");

    match kind {
        LineKind::Blank => Dispatch::line(String::new()),
        LineKind::Doctype => convert_doctype(stripped),
        LineKind::HamlComment => Dispatch::line(format!("<%# {} %>", stripped[2..].trim())),
        LineKind::Element | LineKind::ClassShorthand | LineKind::IdShorthand => {
            convert_tag(stripped, has_children)
        }
        LineKind::Output => convert_output(stripped[1..].trim()),
        LineKind::Code => convert_code(stripped),
        LineKind::EscapedOutput => Dispatch::line(format!("<%= {} %>", stripped[2..].trim())),
        LineKind::UnescapedOutput => Dispatch::line(format!("<%== {} %>", stripped[2..].trim())),
        LineKind::HtmlComment => Dispatch::line(format!("<!-- {} -->", stripped[1..].trim())),
        LineKind::Filter => match FilterKind::from_name(stripped[1..].trim()) {
            Some(filter) => Dispatch::FilterStart(filter),
            None => Dispatch::Passthrough,
        },
        LineKind::Text => Dispatch::line(convert_text(stripped)),
    }
}

fn convert_doctype(stripped: &str) -> Dispatch {
    if stripped == "!!!" {
        Dispatch::line("<!DOCTYPE html>".to_string())
    } else {
        Dispatch::Passthrough
    }
}

fn convert_tag(stripped: &str, has_children: bool) -> Dispatch {
    match parse_tag(stripped) {
        Some(tag) => {
            let rendered = build_tag(&tag, has_children);
            Dispatch::Rendered {
                body: rendered.markup,
                closer: rendered.closer,
            }
        }
        None => Dispatch::Passthrough,
    }
}

/// `= expr`, with an optional ` # comment` trailer outside string literals.
fn convert_output(code: &str) -> Dispatch {
    let (expr, comment) = match find_comment_trailer(code) {
        Some(at) => (code[..at].trim_end(), Some(code[at + 2..].trim())),
        None => (code, None),
    };

    let mut body = format!("<%= {expr} %>");
    if let Some(comment) = comment {
        body.push_str(&format!(" <%# {comment} %>"));
    }

    let closer = has_do_block(expr).then(|| END_MARKER.to_string());
    Dispatch::Rendered { body, closer }
}

fn convert_code(stripped: &str) -> Dispatch {
    let code = stripped[1..].trim();
    let closer = (!is_continuation(stripped) && opens_block(code)).then(|| END_MARKER.to_string());
    Dispatch::Rendered {
        body: format!("<% {code} %>"),
        closer,
    }
}

fn convert_text(stripped: &str) -> String {
    rewrite_interpolation(stripped).replace("\\-", "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::PhysicalLine;

    fn run(text: &str, has_children: bool) -> Dispatch {
        dispatch(&LogicalLine::single(&PhysicalLine::new(text)), has_children)
    }

    fn body(text: &str) -> String {
        match run(text, false) {
            Dispatch::Rendered { body, .. } => body,
            other => panic!("expected rendered line, got {other:?}"),
        }
    }

    fn closer(text: &str) -> Option<String> {
        match run(text, true) {
            Dispatch::Rendered { closer, .. } => closer,
            other => panic!("expected rendered line, got {other:?}"),
        }
    }

    #[test]
    fn test_output_forms() {
        assert_eq!(body("= user.name"), "<%= user.name %>");
        assert_eq!(body("&= user.bio"), "<%= user.bio %>");
        assert_eq!(body("!= user.html"), "<%== user.html %>");
    }

    #[test]
    fn test_output_comment_trailer() {
        assert_eq!(body("= test # test"), "<%= test %> <%# test %>");
        assert_eq!(body(r#"= t("a #b")"#), r#"<%= t("a #b") %>"#);
        assert_eq!(body(r##"= "#{a} b""##), r##"<%= "#{a} b" %>"##);
    }

    #[test]
    fn test_comments_and_doctype() {
        assert_eq!(body("-# internal note"), "<%# internal note %>");
        assert_eq!(body("/ visible note"), "<!-- visible note -->");
        assert_eq!(body("!!!"), "<!DOCTYPE html>");
        assert_eq!(run("!!! Strict", false), Dispatch::Passthrough);
    }

    #[test]
    fn test_text() {
        assert_eq!(body("Hello #{name}"), "Hello <%= name %>");
        assert_eq!(body(r"\- not code"), "- not code");
        assert_eq!(body(r"\#{literal}"), "#{literal}");
    }

    #[test]
    fn test_code_block_closers() {
        assert_eq!(closer("- if user").as_deref(), Some(END_MARKER));
        assert_eq!(closer("- @posts.each do |post|").as_deref(), Some(END_MARKER));
        assert_eq!(closer("= form_for user do |f|").as_deref(), Some(END_MARKER));
        assert_eq!(closer("- else"), None);
        assert_eq!(closer("- breadcrumb :test"), None);
        assert_eq!(closer("= link_to 'a', b"), None);
    }

    #[test]
    fn test_filters() {
        assert_eq!(run(":ruby", false), Dispatch::FilterStart(FilterKind::Ruby));
        assert_eq!(run(":javascript", false), Dispatch::Passthrough);
    }

    #[test]
    fn test_tags() {
        assert_eq!(body("%div Hello"), "<div>Hello</div>");
        assert_eq!(closer("%section").as_deref(), Some("</section>"));
        assert_eq!(closer(".card").as_deref(), Some("</div>"));
        assert_eq!(run("%", false), Dispatch::Passthrough);
    }

    #[test]
    fn test_blank_renders_empty() {
        assert_eq!(body("   "), "");
    }
}
