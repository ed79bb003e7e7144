//! Property checks over generated documents.
//!
//! Documents are built from a fixed set of line shapes with a small
//! deterministic generator, so every run checks the same inputs.
//!
//! Run with: cargo test --test invariants

use haml2erb::generate::attributes::merge_class;
use haml2erb::parser::scan::{extract_balanced_braces, smart_split};
use haml2erb::{convert, convert_with_stats};
use libtest_mimic::{Arguments, Failed, Trial};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const LINE_SHAPES: &[&str] = &[
    "%div",
    "%p Hello #{name}",
    ".card.wide",
    "#main{ role: 'main' }",
    "- if user",
    "- else",
    "- items.each do |item|",
    "= render item",
    "= form_for x do |f|",
    "%li= link_to path do",
    "%br",
    "%img{ src: image_url }",
    "/ note",
    "-# hidden",
    "plain text",
    ":ruby",
    "",
];

/// Linear congruential generator; good enough to shuffle line shapes.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

/// A document whose indentation wanders up and down by at most one level.
fn generate_document(seed: u64, len: usize) -> String {
    let mut rng = Lcg(seed);
    let mut depth = 0usize;
    let mut out = String::new();
    for _ in 0..len {
        let shape = LINE_SHAPES[rng.below(LINE_SHAPES.len())];
        match rng.below(3) {
            0 if depth > 0 => depth -= rng.below(depth) + 1,
            1 => depth += 1,
            _ => {}
        }
        if !shape.is_empty() {
            out.push_str(&"  ".repeat(depth));
        }
        out.push_str(shape);
        out.push('\n');
    }
    out
}

fn check_frames_balance() -> Result<(), Failed> {
    for seed in 0..200 {
        let document = generate_document(seed, 40);
        let conversion = convert_with_stats(&document);
        let emitted = conversion.erb.lines().filter(|line| is_closer_line(line)).count();
        if emitted != conversion.stats.frames_opened {
            return Err(format!(
                "seed {seed}: pushed {} frames but emitted {emitted} closers\n{document}\n{}",
                conversion.stats.frames_opened, conversion.erb
            )
            .into());
        }
    }
    Ok(())
}

/// A line holding nothing but `<% end %>`, a closing tag, or both.
fn is_closer_line(line: &str) -> bool {
    let line = line.trim();
    let rest = line.strip_prefix("<% end %>").unwrap_or(line);
    if rest.is_empty() {
        return line != rest;
    }
    rest.strip_prefix("</")
        .and_then(|tag| tag.strip_suffix('>'))
        .is_some_and(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

fn check_void_tags_never_closed() -> Result<(), Failed> {
    for tag in VOID_TAGS {
        let variants = [
            format!("%{tag}"),
            format!("%{tag} content"),
            format!("%{tag}= value"),
            format!("%{tag}.cls{{ id: 'x' }}"),
            format!("%{tag}\n  child"),
            format!("%div\n  %{tag}\n    %span nested"),
        ];
        for haml in &variants {
            let erb = convert(haml);
            if erb.contains(&format!("</{tag}>")) {
                return Err(format!("{haml:?} produced a closing tag:\n{erb}").into());
            }
        }
    }
    Ok(())
}

fn check_output_is_newline_terminated() -> Result<(), Failed> {
    for seed in 0..100 {
        let document = generate_document(seed, 25);
        let trimmed = document.trim_end_matches('\n');
        let erb = convert(trimmed);
        if !erb.is_empty() && !erb.ends_with('\n') {
            return Err(format!("seed {seed}: output lacks final newline").into());
        }
    }
    Ok(())
}

fn check_class_merge() -> Result<(), Failed> {
    let sides = [
        "a b c",
        "c d",
        "b",
        "",
        "x <%= dynamic %> y",
        "<%= dynamic %> a",
        "  spaced   out  ",
    ];
    for base in sides {
        for additional in sides {
            let merged = merge_class(base, additional);
            let merged_tokens = smart_tokens(&merged);
            let mut expected: Vec<String> = Vec::new();
            for token in smart_tokens(base).into_iter().chain(smart_tokens(additional)) {
                if !expected.contains(&token) {
                    expected.push(token);
                }
            }
            if merged_tokens != expected {
                return Err(format!(
                    "merge_class({base:?}, {additional:?}) = {merged:?}, expected tokens {expected:?}"
                )
                .into());
            }
        }
    }
    Ok(())
}

/// Tokens with `<%= ... %>` spans kept whole.
fn smart_tokens(value: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_erb = false;
    for word in value.split_whitespace() {
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
        if word.starts_with("<%") {
            in_erb = true;
        }
        if word.ends_with("%>") {
            in_erb = false;
        }
        if !in_erb {
            tokens.push(std::mem::take(&mut current));
        }
    }
    tokens
}

fn check_balanced_extraction() -> Result<(), Failed> {
    let inners = [
        "",
        " a: 1 ",
        " a: { b: 2 } ",
        r#" title: "}{" "#,
        " title: '{' ",
        r#" a: "x\"}" "#,
        " data: { x: { y: 'z' } } ",
    ];
    for inner in inners {
        for tail in ["", " rest", "= code", " {not: part}"] {
            let text = format!("{{{inner}}}{tail}");
            let Some(group) = extract_balanced_braces(&text) else {
                return Err(format!("no group found in {text:?}").into());
            };
            if group.content != inner || group.remaining != tail {
                return Err(format!(
                    "{text:?} split into {:?} / {:?}",
                    group.content, group.remaining
                )
                .into());
            }
        }
    }
    Ok(())
}

fn check_split_rejoins() -> Result<(), Failed> {
    let blobs = [
        "a: 1, b: 'x, y', c: f(1, 2)",
        r#"title: "a, b", data: { a: 1, b: 2 }"#,
        "one",
        "x: [1, 2], y: :z",
    ];
    for blob in blobs {
        let joined = smart_split(blob, ',').join(",");
        if joined != blob {
            return Err(format!("splitting {blob:?} lost text: {joined:?}").into());
        }
    }
    Ok(())
}

fn check_deterministic() -> Result<(), Failed> {
    for seed in 0..50 {
        let document = generate_document(seed, 30);
        if convert(&document) != convert(&document) {
            return Err(format!("seed {seed}: output differs between runs").into());
        }
    }
    Ok(())
}

fn main() {
    let args = Arguments::from_args();

    let trials = vec![
        Trial::test("frames_balance", check_frames_balance),
        Trial::test("void_tags_never_closed", check_void_tags_never_closed),
        Trial::test("output_is_newline_terminated", check_output_is_newline_terminated),
        Trial::test("class_merge_dedupes_in_order", check_class_merge),
        Trial::test("balanced_extraction", check_balanced_extraction),
        Trial::test("split_rejoins", check_split_rejoins),
        Trial::test("deterministic", check_deterministic),
    ];

    libtest_mimic::run(&args, trials).exit();
}
