//! Per-conversion state machines: open scopes and the active filter.

mod filter;
mod stack;

pub use filter::{FilterKind, FilterState};
pub use stack::{has_do_block, is_continuation, opens_block, BlockFrame, BlockStack, END_MARKER};
