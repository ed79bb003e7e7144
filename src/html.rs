//! HTML element classification used when rendering tags.

/// Void elements: cannot have children or a closing tag.
/// https://html.spec.whatwg.org/multipage/syntax.html#void-elements
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input",
    "link", "meta", "param", "source", "track", "wbr",
];

/// Tag used for bare `.class` and `#id` lines.
pub const GENERIC_CONTAINER: &str = "div";

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

pub fn closing_tag(tag: &str) -> String {
    format!("</{tag}>")
}
