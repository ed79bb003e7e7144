//! Source-side analysis: raw lines, logical-line folding, tag lines and
//! attribute literals.

pub mod attributes;
pub mod lines;
pub mod merge;
pub mod scan;
pub mod tag;

pub use attributes::{parse_attributes, LiteralValue, ParsedAttribute};
pub use lines::{split_lines, LineKind, LogicalLine, PhysicalLine};
pub use merge::merge_lines;
pub use tag::{parse_tag, InlineOutput, TagRecord};
