//! Internal implementation details.

pub(crate) mod construct;
pub(crate) mod reentry;

pub use reentry::ReentrantPanic;
pub(crate) use construct::observed;
pub(crate) use reentry::{guard_addr, ConstructionFrame};
