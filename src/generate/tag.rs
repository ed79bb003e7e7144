use tracing::trace;

use super::attributes::{entries_from, AttributeEntry, AttributeSet};
use crate::html::{closing_tag, is_void_element};
use crate::parser::scan::rewrite_interpolation;
use crate::parser::{parse_attributes, InlineOutput, TagRecord};
use crate::scope::{has_do_block, END_MARKER};

/// A tag rendered onto one output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTag {
    pub markup: String,
    /// Closing tag still owed, set only when the tag was left open
    pub closer: Option<String>,
}

/// Shorthand classes and ids first, then the literal blob merged on top.
pub fn compose_attributes(tag: &TagRecord) -> AttributeSet {
    let mut set = AttributeSet::new();

    let mut base = Vec::new();
    if !tag.classes.is_empty() {
        base.push(AttributeEntry::literal("class", &tag.classes.join(" ")));
    }
    if !tag.ids.is_empty() {
        base.push(AttributeEntry::literal("id", &tag.ids.join(" ")));
    }
    set.merge(base);

    if let Some(blob) = &tag.attribute_literal {
        set.merge(entries_from(parse_attributes(blob)));
    }
    set
}

/// Render a parsed tag line.
pub fn build_tag(tag: &TagRecord, has_children: bool) -> RenderedTag {
    let name = &tag.tag_name;
    let open = format!("<{name}{}>", compose_attributes(tag).render());

    if is_void_element(name) {
        trace!(tag = %name, "void element");
        return closed(open);
    }

    if tag.has_embedded_expression {
        let wrapper = match tag.output {
            InlineOutput::Escaped => "<%=",
            InlineOutput::Unescaped => "<%==",
        };
        let expression = format!("{open}{wrapper} {} %>", tag.content);
        // `%li= link_to path do` with children: the block body sits inside the tag
        if has_children && has_do_block(&tag.content) {
            return RenderedTag {
                markup: expression,
                closer: Some(format!("{END_MARKER}{}", closing_tag(name))),
            };
        }
        return closed(format!("{expression}{}", closing_tag(name)));
    }

    // Inline text is dropped once the tag has children of its own.
    if has_children {
        if !tag.content.is_empty() {
            trace!(tag = %name, content = %tag.content, "inline text dropped for tag with children");
        }
        return RenderedTag {
            markup: open,
            closer: Some(closing_tag(name)),
        };
    }

    if tag.content.is_empty() {
        return closed(format!("{open}{}", closing_tag(name)));
    }

    closed(format!(
        "{open}{}{}",
        rewrite_interpolation(&tag.content),
        closing_tag(name)
    ))
}

fn closed(markup: String) -> RenderedTag {
    RenderedTag {
        markup,
        closer: None,
    }
}
