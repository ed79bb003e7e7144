//! Attribute-literal parser.
//!
//! The blob between the braces of `%tag{ ... }` is split on top-level commas
//! and every fragment is matched against an ordered rule table. The first
//! rule whose pattern matches and whose constructor accepts the captures
//! wins; a fragment no rule accepts is dropped.
//!
//! Order matters: the bare-key code rule at the end matches almost anything
//! of the form `key: ...`, so every more specific form sits above it.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use super::scan::{extract_balanced_braces, rewrite_interpolation, smart_split};

const BARE_KEY: &str = r"([A-Za-z_-][\w-]*)";
const QUOTED_KEY: &str = r#"(?:"([A-Za-z_-][\w-]*)"|'([A-Za-z_-][\w-]*)')"#;
const QUOTED_VALUE: &str = r#"(?:"((?:[^"\\]|\\.)*)"|'((?:[^'\\]|\\.)*)')"#;
const SYMBOL_KEY: &str = r":([A-Za-z_][\w-]*)";

/// Value of one parsed attribute fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    /// Quoted string, unescaped; `#{}` already rewritten for double quotes
    Str(String),
    /// Decimal integer, kept as written
    Number(String),
    /// Symbol atom without its colon (`:delete` -> `delete`)
    Symbol(String),
    Bool(bool),
    /// Opaque Ruby expression
    Code(String),
    /// `key: { ... }` family; only quoted-string members are kept
    Group(Vec<ParsedAttribute>),
}

/// One `key: value` fragment of an attribute literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttribute {
    /// Normalized key
    pub key: String,
    pub value: LiteralValue,
}

impl ParsedAttribute {
    fn new(key: &str, value: LiteralValue) -> Self {
        Self {
            key: normalize_key(key),
            value,
        }
    }
}

type Constructor = fn(&Captures) -> Option<ParsedAttribute>;

/// One entry of the ordered fragment grammar.
struct Rule {
    name: &'static str,
    pattern: Regex,
    build: Constructor,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, build: Constructor) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            build,
        }
    }

    fn apply(&self, fragment: &str) -> Option<ParsedAttribute> {
        let caps = self.pattern.captures(fragment)?;
        (self.build)(&caps)
    }
}

lazy_static! {
    static ref RULES: Vec<Rule> = vec![
        Rule::new("nested_group", &format!(r"^{BARE_KEY}\s*:\s*(\{{.*\}})$"), nested_group),
        Rule::new("legacy_string", &format!(r"^{SYMBOL_KEY}\s*=>\s*{QUOTED_VALUE}$"), legacy_string),
        Rule::new("legacy_number", &format!(r"^{SYMBOL_KEY}\s*=>\s*(-?\d+)$"), legacy_number),
        Rule::new("quoted_key_string", &format!(r"^{QUOTED_KEY}\s*:\s*{QUOTED_VALUE}$"), quoted_key_string),
        Rule::new("quoted_key_boolean", &format!(r"^{QUOTED_KEY}\s*:\s*(true|false)$"), quoted_key_boolean),
        Rule::new("quoted_key_code", &format!(r"^{QUOTED_KEY}\s*:\s*(.+)$"), quoted_key_code),
        Rule::new("method_call", &format!(r"^{BARE_KEY}\s*:\s*([A-Za-z_@][\w@.:&?!\[\]]*\(.*)$"), bare_code),
        Rule::new(
            "constant_access",
            &format!(r"^{BARE_KEY}\s*:\s*((?:[A-Z@]|[A-Za-z_]\w*(?:::|&?\.|\[))[\w@.:&?!\[\]]*)$"),
            bare_code,
        ),
        Rule::new("bare_key_string", &format!(r"^{BARE_KEY}\s*:\s*{QUOTED_VALUE}$"), bare_key_string),
        Rule::new("bare_key_boolean", &format!(r"^{BARE_KEY}\s*:\s*(true|false)$"), bare_key_boolean),
        Rule::new("bare_key_integer", &format!(r"^{BARE_KEY}\s*:\s*(-?\d+)$"), bare_key_integer),
        Rule::new("bare_key_symbol", &format!(r"^{BARE_KEY}\s*:\s*:([A-Za-z_]\w*[?!]?)$"), bare_key_symbol),
        Rule::new("bare_key_code", &format!(r"^{BARE_KEY}\s*:\s*(.+)$"), bare_code),
    ];
}

/// Parse an attribute blob into attributes, in fragment order.
pub fn parse_attributes(blob: &str) -> Vec<ParsedAttribute> {
    smart_split(blob, ',')
        .into_iter()
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .filter_map(parse_fragment)
        .collect()
}

/// Parse a single fragment with the first rule that accepts it.
pub fn parse_fragment(fragment: &str) -> Option<ParsedAttribute> {
    for rule in RULES.iter() {
        if let Some(attr) = rule.apply(fragment) {
            debug!(rule = rule.name, key = %attr.key, "parsed attribute");
            return Some(attr);
        }
    }
    debug!(fragment, "attribute fragment not recognized, dropped");
    None
}

/// Underscores become hyphens unless the key already has a hyphen.
pub fn normalize_key(key: &str) -> String {
    if key.contains('-') {
        key.to_string()
    } else {
        key.replace('_', "-")
    }
}

/// Key from a `"key"`/`'key'` alternation at groups 1 and 2.
fn quoted_key<'c>(caps: &'c Captures) -> &'c str {
    caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str())
}

/// String value from a `QUOTED_VALUE` alternation starting at group `first`.
fn quoted_value(caps: &Captures, first: usize) -> Option<LiteralValue> {
    if let Some(double) = caps.get(first) {
        return Some(LiteralValue::Str(rewrite_interpolation(&unescape(double.as_str()))));
    }
    caps.get(first + 1)
        .map(|single| LiteralValue::Str(unescape(single.as_str())))
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(next @ ('"' | '\'' | '\\')) => out.push(next),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn nested_group(caps: &Captures) -> Option<ParsedAttribute> {
    let group = extract_balanced_braces(&caps[2])?;
    if !group.remaining.trim().is_empty() {
        return None;
    }

    let members = parse_attributes(group.content)
        .into_iter()
        .filter(|member| matches!(member.value, LiteralValue::Str(_)))
        .collect();
    Some(ParsedAttribute::new(&caps[1], LiteralValue::Group(members)))
}

fn legacy_string(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], quoted_value(caps, 2)?))
}

fn legacy_number(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], LiteralValue::Number(caps[2].to_string())))
}

fn quoted_key_string(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(quoted_key(caps), quoted_value(caps, 3)?))
}

fn quoted_key_boolean(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(quoted_key(caps), LiteralValue::Bool(&caps[3] == "true")))
}

fn quoted_key_code(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(quoted_key(caps), LiteralValue::Code(caps[3].trim().to_string())))
}

fn bare_key_string(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], quoted_value(caps, 2)?))
}

fn bare_key_boolean(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], LiteralValue::Bool(&caps[2] == "true")))
}

fn bare_key_integer(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], LiteralValue::Number(caps[2].to_string())))
}

fn bare_key_symbol(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], LiteralValue::Symbol(caps[2].to_string())))
}

fn bare_code(caps: &Captures) -> Option<ParsedAttribute> {
    Some(ParsedAttribute::new(&caps[1], LiteralValue::Code(caps[2].trim().to_string())))
}
