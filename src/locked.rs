//! Lazy guard serialized by a mutex on every access.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, MutexGuard};

use crate::internal::{self, guard_addr, ConstructionFrame};
use crate::{GuardKey, InitState, InstanceGuard, Strategy};

/// Lazy guard that takes a lock around check-and-construct on every call.
///
/// The first [`get`](LockedGuard::get) runs the constructor while holding the
/// guard mutex; concurrent first callers block until it finishes and then see
/// the same instance. The lock is taken on every later call too, so this
/// strategy pays a synchronization cost for the guard's whole lifetime.
/// [`HolderGuard`](crate::HolderGuard) avoids that and is usually the better
/// choice.
///
/// The instance lives in a write-once slot, which is what allows `get` to hand
/// out a plain `&T` after the lock is released.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{InitState, InstanceGuard, LockedGuard};
///
/// struct Catalog {
///     entries: Vec<&'static str>,
/// }
///
/// static CATALOG: LockedGuard<Catalog> = LockedGuard::new(|| Catalog {
///     entries: vec!["alpha", "beta"],
/// });
///
/// assert_eq!(CATALOG.state(), InitState::Uninitialized);
/// let first = CATALOG.get();
/// let again = CATALOG.get();
/// assert!(std::ptr::eq(first, again));
/// assert_eq!(CATALOG.constructions(), 1);
/// ```
///
/// # Panics
///
/// If the constructor accesses this same guard, `get` panics with a
/// [`ReentrantPanic`](crate::ReentrantPanic) instead of deadlocking. If the
/// constructor itself panics, the guard stays uninitialized and a later call
/// tries again.
pub struct LockedGuard<T, F = fn() -> T> {
    lock: Mutex<()>,
    slot: OnceCell<T>,
    init: F,
    constructions: AtomicUsize,
    label: Option<&'static str>,
}

impl<T, F> LockedGuard<T, F> {
    /// Creates an uninitialized guard. Usable in `static` initializers.
    pub const fn new(init: F) -> Self {
        Self {
            lock: parking_lot::const_mutex(()),
            slot: OnceCell::new(),
            init,
            constructions: AtomicUsize::new(0),
            label: None,
        }
    }

    /// Creates an uninitialized guard carrying a diagnostic label.
    pub const fn with_label(label: &'static str, init: F) -> Self {
        Self::new(init).labeled(label)
    }

    /// Attaches a label shown in diagnostics.
    pub const fn labeled(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Returns the instance if it has been constructed, without locking and
    /// without constructing.
    #[inline]
    pub fn try_get(&self) -> Option<&T> {
        self.slot.get()
    }

    pub(crate) fn guard_key(&self) -> GuardKey {
        GuardKey::with_label::<T>(self.label)
    }

    pub(crate) fn constructed_count(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }

    /// Takes the guard lock. Panics instead of deadlocking when the current
    /// thread is already running this guard's constructor.
    pub(crate) fn lock(&self) -> MutexGuard<'_, ()> {
        ConstructionFrame::check(guard_addr(self), std::any::type_name::<T>());
        self.lock.lock()
    }
}

impl<T, F> LockedGuard<T, F>
where
    F: Fn() -> T,
{
    /// Returns the instance, constructing it on the first call.
    ///
    /// Always acquires the guard mutex.
    pub fn get(&self) -> &T {
        let held = self.lock();
        match self.slot.get() {
            Some(instance) => instance,
            None => self.construct_held(&held, Strategy::Locked),
        }
    }

    /// Runs the constructor and publishes its result.
    ///
    /// Requires the guard lock, proven by `_held`, and an empty slot.
    pub(crate) fn construct_held(&self, _held: &MutexGuard<'_, ()>, strategy: Strategy) -> &T {
        let _frame = ConstructionFrame::enter(guard_addr(self), std::any::type_name::<T>());
        let value = internal::observed(self.guard_key(), strategy, &self.init);
        // The slot is empty and we hold the lock, so this stores `value`.
        let instance = self.slot.get_or_init(|| value);
        self.constructions.fetch_add(1, Ordering::AcqRel);
        instance
    }
}

impl<T, F> InstanceGuard for LockedGuard<T, F>
where
    F: Fn() -> T,
{
    type Target = T;

    fn instance(&self) -> &T {
        self.get()
    }

    fn key(&self) -> GuardKey {
        self.guard_key()
    }

    fn strategy(&self) -> Strategy {
        Strategy::Locked
    }

    fn state(&self) -> InitState {
        InitState::from_populated(self.slot.get().is_some())
    }

    fn constructions(&self) -> usize {
        self.constructed_count()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for LockedGuard<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedGuard")
            .field("label", &self.label)
            .field("value", &self.slot.get())
            .finish()
    }
}
