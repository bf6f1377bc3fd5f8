//! Eager guard: the instance exists before anyone asks for it.

use std::fmt;
use std::ops::Deref;

use crate::internal;
use crate::{GuardKey, InitState, InstanceGuard, Strategy};

/// Guard whose instance is built together with the guard.
///
/// In a `static`, [`EagerGuard::new`] is evaluated at compile time, so the
/// instance is part of the binary's data and no code can observe the guard
/// before it exists. [`EagerGuard::from_fn`] runs a factory immediately for
/// values that cannot be built in a `const` context; the guard is then
/// typically owned by some longer-lived structure or leaked into a
/// `&'static`.
///
/// Access is a plain field read with no synchronization. The trade-off is
/// that construction is paid even if the instance is never used.
///
/// # Examples
///
/// ```rust
/// use instance_guard::EagerGuard;
///
/// struct Limits {
///     max_connections: u32,
///     max_body_bytes: usize,
/// }
///
/// static LIMITS: EagerGuard<Limits> = EagerGuard::new(Limits {
///     max_connections: 512,
///     max_body_bytes: 1 << 20,
/// });
///
/// let a = LIMITS.get();
/// let b = LIMITS.get();
/// assert!(std::ptr::eq(a, b));
/// assert_eq!(a.max_connections, 512);
/// ```
pub struct EagerGuard<T> {
    value: T,
    label: Option<&'static str>,
}

impl<T> EagerGuard<T> {
    /// Wraps an already-built instance. Usable in `static` initializers.
    pub const fn new(value: T) -> Self {
        Self { value, label: None }
    }

    /// Runs `factory` now, exactly once, and guards its result.
    ///
    /// ```rust
    /// use instance_guard::{EagerGuard, InitState, InstanceGuard};
    ///
    /// let guard = EagerGuard::from_fn(|| (1..=4).product::<u64>());
    /// // Already built before the first access.
    /// assert_eq!(guard.state(), InitState::Initialized);
    /// assert_eq!(*guard.get(), 24);
    /// ```
    pub fn from_fn<F>(factory: F) -> Self
    where
        F: FnOnce() -> T,
    {
        Self::build(None, factory)
    }

    /// Like [`from_fn`](Self::from_fn), with a label that observers already
    /// see while the factory runs.
    ///
    /// ```rust
    /// use instance_guard::{EagerGuard, InstanceGuard};
    ///
    /// let guard = EagerGuard::from_fn_labeled("primes", || vec![2u32, 3, 5, 7]);
    /// assert_eq!(guard.key().display_name(), "Vec<u32>[primes]");
    /// ```
    pub fn from_fn_labeled<F>(label: &'static str, factory: F) -> Self
    where
        F: FnOnce() -> T,
    {
        Self::build(Some(label), factory)
    }

    fn build<F>(label: Option<&'static str>, factory: F) -> Self
    where
        F: FnOnce() -> T,
    {
        let value = internal::observed(GuardKey::with_label::<T>(label), Strategy::Eager, factory);
        Self { value, label }
    }

    /// Attaches a label shown in diagnostics.
    ///
    /// Observers of a [`from_fn`](Self::from_fn) factory saw the guard
    /// unlabeled; use [`from_fn_labeled`](Self::from_fn_labeled) instead.
    pub const fn labeled(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Returns the instance. Never blocks, never fails.
    #[inline]
    pub fn get(&self) -> &T {
        &self.value
    }
}

impl<T> Deref for EagerGuard<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> InstanceGuard for EagerGuard<T> {
    type Target = T;

    fn instance(&self) -> &T {
        self.get()
    }

    fn key(&self) -> GuardKey {
        GuardKey::with_label::<T>(self.label)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Eager
    }

    fn state(&self) -> InitState {
        InitState::Initialized
    }

    fn constructions(&self) -> usize {
        1
    }
}

impl<T: fmt::Debug> fmt::Debug for EagerGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EagerGuard")
            .field("label", &self.label)
            .field("value", &self.value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn factory_runs_before_first_access() {
        let calls = AtomicUsize::new(0);
        let guard = EagerGuard::from_fn(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            vec![1, 2, 3]
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(guard.get().len(), 3);
        assert_eq!(guard.len(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn const_guard_in_static() {
        static NAME: EagerGuard<&str> = EagerGuard::new("eager").labeled("name");
        assert_eq!(*NAME.get(), "eager");
        assert_eq!(NAME.key().label(), Some("name"));
        assert_eq!(NAME.snapshot().constructions, 1);
    }

    #[test]
    fn labeled_factory_keeps_label() {
        let guard = EagerGuard::from_fn_labeled("five", || 5u8);
        assert_eq!(*guard.get(), 5);
        assert_eq!(guard.key(), GuardKey::with_label::<u8>(Some("five")));
        assert_eq!(guard.snapshot().key.display_name(), "u8[five]");
    }
}
