//! Target-side rendering: attributes, tags, per-line conversion and the
//! output buffer.

pub mod attributes;
mod dispatch;
mod output;
pub mod tag;

pub use attributes::{AttributeEntry, AttributeSet, EntryValue};
pub use dispatch::{dispatch, Dispatch};
pub use output::{Output, Stats};
pub use tag::{build_tag, RenderedTag};
