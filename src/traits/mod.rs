//! Core traits for instance guards.

mod guard;

pub use guard::{GuardSnapshot, InstanceGuard};
