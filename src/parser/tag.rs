use super::scan::extract_balanced_braces;
use crate::html::GENERIC_CONTAINER;

/// How inline output after a tag is written (`%p= x`, `%p&= x`, `%p!= x`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InlineOutput {
    #[default]
    Escaped,
    Unescaped,
}

/// Components of one element-declaring line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagRecord {
    pub tag_name: String,
    /// Class shorthand tokens in source order
    pub classes: Vec<String>,
    /// Id shorthand tokens in source order
    pub ids: Vec<String>,
    /// Raw text between the braces of `{...}`, if present
    pub attribute_literal: Option<String>,
    /// Trailing content; Ruby code when `has_embedded_expression` is set
    pub content: String,
    pub has_embedded_expression: bool,
    pub output: InlineOutput,
}

/// Parse an element (`%tag`), class (`.cls`) or id (`#id`) line.
///
/// `stripped` must already be trimmed. Returns `None` when the line does not
/// name a tag or carries no shorthand token.
pub fn parse_tag(stripped: &str) -> Option<TagRecord> {
    let mut record = TagRecord::default();

    let rest = if let Some(after) = stripped.strip_prefix('%') {
        let end = after
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
            .unwrap_or(after.len());
        if end == 0 {
            return None;
        }
        record.tag_name = after[..end].to_string();
        let rest = &after[end..];
        if rest.starts_with(['.', '#']) {
            parse_shorthand(rest, &mut record)
        } else {
            rest
        }
    } else if stripped.starts_with(['.', '#']) {
        record.tag_name = GENERIC_CONTAINER.to_string();
        let rest = parse_shorthand(stripped, &mut record);
        if record.classes.is_empty() && record.ids.is_empty() {
            return None;
        }
        rest
    } else {
        return None;
    };

    let mut rest = rest;
    if rest.trim_start().starts_with('{') {
        if let Some(group) = extract_balanced_braces(rest) {
            record.attribute_literal = Some(group.content.to_string());
            rest = group.remaining;
        }
    }

    parse_content(rest.trim(), &mut record);
    Some(record)
}

/// Consume a chain of `.class` / `#id` tokens, returning what follows it.
fn parse_shorthand<'a>(text: &'a str, record: &mut TagRecord) -> &'a str {
    let mut end = text.len();
    for (i, c) in text.char_indices() {
        let chained = c.is_ascii_alphanumeric()
            || matches!(c, '_' | '-' | ':' | '.')
            || (c == '#' && !text[i + 1..].starts_with('{'));
        if !chained {
            end = i;
            break;
        }
    }

    let chain = &text[..end];
    let mut start = 0;
    for (i, c) in chain.char_indices().skip(1) {
        if c == '.' || c == '#' {
            push_token(&chain[start..i], record);
            start = i;
        }
    }
    if !chain.is_empty() {
        push_token(&chain[start..], record);
    }

    &text[end..]
}

fn push_token(token: &str, record: &mut TagRecord) {
    let (sigil, name) = token.split_at(1);
    if name.is_empty() {
        return;
    }
    match sigil {
        "." => record.classes.push(name.to_string()),
        "#" => record.ids.push(name.to_string()),
        _ => {}
    }
}

fn parse_content(content: &str, record: &mut TagRecord) {
    let (code, output) = if let Some(code) = content.strip_prefix("!=") {
        (code, InlineOutput::Unescaped)
    } else if let Some(code) = content.strip_prefix("&=") {
        (code, InlineOutput::Escaped)
    } else if let Some(code) = content.strip_prefix('=') {
        (code, InlineOutput::Escaped)
    } else {
        record.content = content.to_string();
        return;
    };

    record.has_embedded_expression = true;
    record.output = output;
    record.content = code.trim().to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_element() {
        let tag = parse_tag("%div Hello").unwrap();
        assert_eq!(tag.tag_name, "div");
        assert_eq!(tag.content, "Hello");
        assert!(tag.classes.is_empty());
        assert!(tag.attribute_literal.is_none());
    }

    #[test]
    fn test_element_with_shorthand_and_output() {
        let tag = parse_tag("%span.text= user.name").unwrap();
        assert_eq!(tag.tag_name, "span");
        assert_eq!(tag.classes, vec!["text"]);
        assert!(tag.has_embedded_expression);
        assert_eq!(tag.content, "user.name");
    }

    #[test]
    fn test_chained_shorthand() {
        let tag = parse_tag("%p.hidden.lg:block#intro.text-xs").unwrap();
        assert_eq!(tag.classes, vec!["hidden", "lg:block", "text-xs"]);
        assert_eq!(tag.ids, vec!["intro"]);
    }

    #[test]
    fn test_class_shorthand_defaults_to_div() {
        let tag = parse_tag(".card.border.active").unwrap();
        assert_eq!(tag.tag_name, "div");
        assert_eq!(tag.classes, vec!["card", "border", "active"]);
        assert_eq!(tag.content, "");
    }

    #[test]
    fn test_id_shorthand_with_class_and_attributes() {
        let tag = parse_tag("#main.wide{ role: 'main' } Body").unwrap();
        assert_eq!(tag.ids, vec!["main"]);
        assert_eq!(tag.classes, vec!["wide"]);
        assert_eq!(tag.attribute_literal.as_deref(), Some(" role: 'main' "));
        assert_eq!(tag.content, "Body");
    }

    #[test]
    fn test_attribute_blob_is_quote_aware() {
        let tag = parse_tag(r#"%a{ title: "}" }= link"#).unwrap();
        assert_eq!(tag.attribute_literal.as_deref(), Some(r#" title: "}" "#));
        assert!(tag.has_embedded_expression);
        assert_eq!(tag.content, "link");
    }

    #[test]
    fn test_unterminated_blob_becomes_content() {
        let tag = parse_tag("%div{ class: 'x'").unwrap();
        assert!(tag.attribute_literal.is_none());
        assert_eq!(tag.content, "{ class: 'x'");
    }

    #[test]
    fn test_unescaped_inline_output() {
        let tag = parse_tag("%p!= raw_html").unwrap();
        assert!(tag.has_embedded_expression);
        assert_eq!(tag.output, InlineOutput::Unescaped);
        assert_eq!(tag.content, "raw_html");
    }

    #[test]
    fn test_interpolation_after_tag_is_content() {
        let tag = parse_tag("%p#{name}").unwrap();
        assert!(tag.ids.is_empty());
        assert_eq!(tag.content, "#{name}");
    }

    #[test]
    fn test_rejects_nameless_tags() {
        assert!(parse_tag("%").is_none());
        assert!(parse_tag("% p").is_none());
        assert!(parse_tag(". text").is_none());
        assert!(parse_tag("plain").is_none());
    }
}
