//! Lazy guard backed by a one-time-initialized holder.

use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;

use crate::internal::{self, guard_addr, ConstructionFrame};
use crate::{GuardKey, InitState, InstanceGuard, Strategy};

/// Lazy guard that delegates exactly-once construction to a [`OnceCell`].
///
/// No lock is taken by guard code. The first caller runs the constructor
/// inside the cell's one-time initialization; concurrent first callers wait on
/// the cell and then share the result. Once initialized, [`get`](HolderGuard::get)
/// is a single atomic load.
///
/// Prefer this over [`LockedGuard`](crate::LockedGuard) unless you need the
/// lock for something else. For a guard that is private to one accessor
/// function, see the [`holder!`](crate::holder) macro.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{HolderGuard, InstanceGuard};
/// use std::collections::HashMap;
///
/// static MIME: HolderGuard<HashMap<&'static str, &'static str>> = HolderGuard::new(|| {
///     HashMap::from([("html", "text/html"), ("json", "application/json")])
/// });
///
/// assert!(MIME.try_get().is_none());
/// assert_eq!(MIME.get()["json"], "application/json");
/// assert_eq!(MIME["html"], "text/html"); // via Deref
/// assert_eq!(MIME.constructions(), 1);
/// ```
///
/// # Panics
///
/// A constructor that accesses its own guard panics with a
/// [`ReentrantPanic`](crate::ReentrantPanic). A constructor that panics
/// leaves the guard uninitialized.
pub struct HolderGuard<T, F = fn() -> T> {
    cell: OnceCell<T>,
    init: F,
    constructions: AtomicUsize,
    label: Option<&'static str>,
}

impl<T, F> HolderGuard<T, F> {
    /// Creates an uninitialized guard. Usable in `static` initializers.
    pub const fn new(init: F) -> Self {
        Self {
            cell: OnceCell::new(),
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

    /// Returns the instance if it has been constructed, without constructing.
    #[inline]
    pub fn try_get(&self) -> Option<&T> {
        self.cell.get()
    }
}

impl<T, F> HolderGuard<T, F>
where
    F: Fn() -> T,
{
    /// Returns the instance, constructing it on the first call.
    #[inline]
    pub fn get(&self) -> &T {
        match self.cell.get() {
            Some(instance) => instance,
            None => self.initialize(),
        }
    }

    #[cold]
    fn initialize(&self) -> &T {
        let _frame = ConstructionFrame::enter(guard_addr(self), std::any::type_name::<T>());
        self.cell.get_or_init(|| {
            let key = GuardKey::with_label::<T>(self.label);
            let value = internal::observed(key, Strategy::Holder, &self.init);
            self.constructions.fetch_add(1, Ordering::AcqRel);
            value
        })
    }
}

impl<T, F> Deref for HolderGuard<T, F>
where
    F: Fn() -> T,
{
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T, F> InstanceGuard for HolderGuard<T, F>
where
    F: Fn() -> T,
{
    type Target = T;

    fn instance(&self) -> &T {
        self.get()
    }

    fn key(&self) -> GuardKey {
        GuardKey::with_label::<T>(self.label)
    }

    fn strategy(&self) -> Strategy {
        Strategy::Holder
    }

    fn state(&self) -> InitState {
        InitState::from_populated(self.cell.get().is_some())
    }

    fn constructions(&self) -> usize {
        self.constructions.load(Ordering::Acquire)
    }
}

impl<T: fmt::Debug, F> fmt::Debug for HolderGuard<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HolderGuard")
            .field("label", &self.label)
            .field("value", &self.cell.get())
            .finish()
    }
}

/// Declares an accessor function backed by a private, nested holder.
///
/// The holder is a `static` inside the function body, so nothing else can
/// reach it and it is only initialized when the accessor first runs.
///
/// ```rust
/// use instance_guard::holder;
///
/// pub struct Settings {
///     pub workers: usize,
/// }
///
/// impl Settings {
///     fn load() -> Self {
///         Settings { workers: 4 }
///     }
/// }
///
/// holder! {
///     /// Process-wide settings, loaded on first use.
///     pub fn settings() -> Settings = Settings::load;
///
///     fn greeting() -> String = || "hello".to_string();
/// }
///
/// assert_eq!(settings().workers, 4);
/// assert!(std::ptr::eq(settings(), settings()));
/// assert_eq!(greeting(), "hello");
/// ```
#[macro_export]
macro_rules! holder {
    ($($(#[$meta:meta])* $vis:vis fn $name:ident() -> $ty:ty = $init:expr;)+) => {
        $(
            $(#[$meta])*
            $vis fn $name() -> &'static $ty {
                static HOLDER: $crate::HolderGuard<$ty> = $crate::HolderGuard::new($init);
                HOLDER.get()
            }
        )+
    };
}
