//! Re-entrant construction detection.

use std::cell::RefCell;
use std::fmt;
use std::panic;

// Guards currently running their constructor on this thread, innermost last.
thread_local! {
    static CONSTRUCTION_TLS: RefCell<Vec<Frame>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy)]
struct Frame {
    addr: usize,
    name: &'static str,
}

/// Panic payload for re-entrant construction.
///
/// Raised when a guard's constructor reaches back into the same guard, which
/// would otherwise deadlock on the guard lock or recurse inside the one-time
/// cell. The path lists the guards under construction, outermost first, and
/// ends with the guard that was entered again.
///
/// Example path: `["Registry", "Catalog", "Registry"]`
#[derive(Debug, Clone)]
pub struct ReentrantPanic {
    /// The chain of guards leading back to the re-entered one.
    pub path: Box<[&'static str]>,
}

impl ReentrantPanic {
    fn new(path: Vec<&'static str>) -> Self {
        ReentrantPanic { path: path.into_boxed_slice() }
    }
}

impl fmt::Display for ReentrantPanic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Re-entrant construction: {}", self.path.join(" -> "))
    }
}

/// Marks a guard as under construction on the current thread until dropped.
///
/// Holder guards enter it before the one-time cell. Locked guards call
/// [`check`](ConstructionFrame::check) before taking the lock and enter once
/// they hold it.
pub(crate) struct ConstructionFrame {
    addr: usize,
}

impl ConstructionFrame {
    pub(crate) fn enter(addr: usize, name: &'static str) -> Self {
        Self::check(addr, name);
        CONSTRUCTION_TLS.with(|tls| tls.borrow_mut().push(Frame { addr, name }));

        Self { addr }
    }

    /// Panics if `addr` is mid-construction on this thread, without pushing
    /// a frame. Used before taking a lock the constructor may already hold.
    pub(crate) fn check(addr: usize, name: &'static str) {
        let path = CONSTRUCTION_TLS.with(|tls| {
            let stack = tls.borrow();
            if stack.iter().any(|frame| frame.addr == addr) {
                let mut path: Vec<&'static str> = stack.iter().map(|frame| frame.name).collect();
                path.push(name);
                Some(path)
            } else {
                None
            }
        });
        if let Some(path) = path {
            panic::panic_any(ReentrantPanic::new(path));
        }
    }

    /// Returns true if any guard on this thread is mid-construction.
    #[cfg(test)]
    pub(crate) fn active() -> bool {
        CONSTRUCTION_TLS.with(|tls| !tls.borrow().is_empty())
    }
}

impl Drop for ConstructionFrame {
    fn drop(&mut self) {
        // Unwinding drops frames innermost first, so the top always matches.
        CONSTRUCTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();
            if let Some(pos) = stack.iter().rposition(|frame| frame.addr == self.addr) {
                stack.remove(pos);
            }
        });
    }
}

/// Address used to identify a guard in the construction stack.
pub(crate) fn guard_addr<G>(guard: &G) -> usize {
    guard as *const G as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_distinct_guards_are_allowed() {
        let outer = ConstructionFrame::enter(1, "Outer");
        {
            let _inner = ConstructionFrame::enter(2, "Inner");
            assert!(ConstructionFrame::active());
        }
        drop(outer);
        assert!(!ConstructionFrame::active());
    }

    #[test]
    fn reentry_panics_with_path() {
        let result = panic::catch_unwind(|| {
            let _a = ConstructionFrame::enter(10, "A");
            let _b = ConstructionFrame::enter(11, "B");
            let _again = ConstructionFrame::enter(10, "A");
        });
        let payload = result.expect_err("re-entry must panic");
        let reentrant = payload.downcast_ref::<ReentrantPanic>().expect("payload type");
        assert_eq!(&*reentrant.path, &["A", "B", "A"]);
        assert_eq!(reentrant.to_string(), "Re-entrant construction: A -> B -> A");
        // Frames were popped during unwind.
        assert!(!ConstructionFrame::active());
    }
}
