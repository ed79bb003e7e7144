//! Rendered attribute entries and the class/style-aware merge.

use tracing::trace;

use crate::parser::{LiteralValue, ParsedAttribute};

/// Value of an attribute as it will appear in the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryValue {
    /// Text placed between the quotes, already escaped/wrapped
    Text(String),
    /// Bare attribute name (`inline`, `disabled`)
    Flag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    pub key: String,
    pub value: EntryValue,
}

impl AttributeEntry {
    /// Literal text value; `"` is written as `&quot;`.
    pub fn literal(key: impl Into<String>, value: &str) -> Self {
        Self {
            key: key.into(),
            value: EntryValue::Text(value.replace('"', "&quot;")),
        }
    }

    /// Embedded expression, wrapped as `<%= code %>` and otherwise untouched.
    pub fn expression(key: impl Into<String>, code: &str) -> Self {
        Self {
            key: key.into(),
            value: EntryValue::Text(format!("<%= {code} %>")),
        }
    }

    pub fn flag(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: EntryValue::Flag,
        }
    }

    pub fn render(&self) -> String {
        match &self.value {
            EntryValue::Text(text) => format!("{}=\"{}\"", self.key, text),
            EntryValue::Flag => self.key.clone(),
        }
    }
}

/// Flatten parsed attributes into renderable entries.
///
/// `false` drops the attribute, `true` becomes a flag and a nested group
/// expands to one `outer-inner` entry per member.
pub fn entries_from(parsed: Vec<ParsedAttribute>) -> Vec<AttributeEntry> {
    let mut entries = Vec::with_capacity(parsed.len());
    for attr in parsed {
        match attr.value {
            LiteralValue::Str(value) => entries.push(AttributeEntry::literal(attr.key, &value)),
            LiteralValue::Number(value) | LiteralValue::Symbol(value) => {
                entries.push(AttributeEntry::literal(attr.key, &value))
            }
            LiteralValue::Bool(true) => entries.push(AttributeEntry::flag(attr.key)),
            LiteralValue::Bool(false) => trace!(key = %attr.key, "false attribute omitted"),
            LiteralValue::Code(code) => entries.push(AttributeEntry::expression(attr.key, &code)),
            LiteralValue::Group(members) => {
                for member in entries_from(members) {
                    entries.push(AttributeEntry {
                        key: format!("{}-{}", attr.key, member.key),
                        value: member.value,
                    });
                }
            }
        }
    }
    entries
}

/// Ordered attribute collection with position-preserving overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    entries: Vec<AttributeEntry>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&EntryValue> {
        self.entries.iter().find(|e| e.key == key).map(|e| &e.value)
    }

    /// Merge `additional` on top of the current entries.
    ///
    /// Valued entries go first: `class` tokens are merged, `style` segments
    /// concatenated and any other key overwritten in place. Flags are added
    /// afterwards, and only for keys that are still absent.
    pub fn merge(&mut self, additional: impl IntoIterator<Item = AttributeEntry>) {
        let (flags, valued): (Vec<_>, Vec<_>) = additional
            .into_iter()
            .partition(|entry| entry.value == EntryValue::Flag);

        for entry in valued {
            self.merge_valued(entry);
        }
        for entry in flags {
            if self.get(&entry.key).is_none() {
                self.entries.push(entry);
            }
        }
    }

    fn merge_valued(&mut self, entry: AttributeEntry) {
        let Some(index) = self.entries.iter().position(|e| e.key == entry.key) else {
            self.entries.push(entry);
            return;
        };

        let existing = &mut self.entries[index];
        let merged = match (&existing.value, entry.value) {
            (EntryValue::Text(base), EntryValue::Text(add)) if entry.key == "class" => {
                EntryValue::Text(merge_class(base, &add))
            }
            (EntryValue::Text(base), EntryValue::Text(add)) if entry.key == "style" => {
                EntryValue::Text(merge_style(base, &add))
            }
            (_, value) => value,
        };
        existing.value = merged;
    }

    /// Attribute text for an opening tag: empty, or a leading space followed
    /// by space-separated entries.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| format!(" {}", entry.render()))
            .collect()
    }
}

/// Join two class values, keeping each token once in first-seen order.
pub fn merge_class(base: &str, additional: &str) -> String {
    let mut tokens: Vec<&str> = Vec::new();
    for token in class_tokens(base).into_iter().chain(class_tokens(additional)) {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens.join(" ")
}

/// Concatenate two style values as `;`-terminated segments.
pub fn merge_style(base: &str, additional: &str) -> String {
    let terminate = |style: &str| {
        let style = style.trim();
        if style.is_empty() || style.ends_with(';') {
            style.to_string()
        } else {
            format!("{style};")
        }
    };
    format!("{} {}", terminate(base), terminate(additional))
        .trim()
        .to_string()
}

/// Whitespace-separated class tokens; a `<% ... %>` span is never split.
fn class_tokens(value: &str) -> Vec<&str> {
    let bytes = value.as_bytes();
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut in_erb = false;
    let mut i = 0;

    while i < bytes.len() {
        if !in_erb && bytes[i..].starts_with(b"<%") {
            in_erb = true;
            start.get_or_insert(i);
            i += 2;
            continue;
        }
        if in_erb && bytes[i..].starts_with(b"%>") {
            in_erb = false;
            i += 2;
            continue;
        }
        if !in_erb && bytes[i].is_ascii_whitespace() {
            if let Some(s) = start.take() {
                tokens.push(&value[s..i]);
            }
        } else {
            start.get_or_insert(i);
        }
        i += 1;
    }

    if let Some(s) = start {
        tokens.push(&value[s..]);
    }
    tokens
}
