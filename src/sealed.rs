//! Tamper-resistant lazy guard.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Serialize};

use crate::locked::LockedGuard;
use crate::observer;
use crate::{GuardError, GuardKey, GuardResult, InitState, InstanceGuard, Strategy};

/// Locked lazy guard that also closes the two ways around the accessor.
///
/// Beyond what [`LockedGuard`] does, a sealed guard:
///
/// - runs the constructor at most once even when it is invoked directly
///   through [`construct`](SealedGuard::construct): once an instance exists,
///   every further attempt fails with [`GuardError::DuplicateConstruction`];
/// - resolves deserialized copies to the canonical instance through
///   [`resolve_deserialized`](SealedGuard::resolve_deserialized). The decoded
///   candidate is dropped, never handed to the caller.
///
/// With the `serde` feature, [`encode`](SealedGuard::encode) and
/// [`decode`](SealedGuard::decode) give a byte codec whose decode path always
/// ends in `resolve_deserialized`.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{GuardError, SealedGuard};
///
/// #[derive(Debug)]
/// struct License {
///     seats: u32,
/// }
///
/// static LICENSE: SealedGuard<License> = SealedGuard::new(|| License { seats: 25 });
///
/// // The first direct construction becomes the canonical instance.
/// let canonical = LICENSE.construct().unwrap();
/// assert_eq!(canonical.seats, 25);
///
/// // Any further attempt is refused.
/// assert!(matches!(LICENSE.construct(), Err(GuardError::DuplicateConstruction(_))));
///
/// // A copy from elsewhere collapses to the canonical instance.
/// let resolved = LICENSE.resolve_deserialized(License { seats: 9999 });
/// assert!(std::ptr::eq(resolved, canonical));
/// assert_eq!(resolved.seats, 25);
/// ```
pub struct SealedGuard<T, F = fn() -> T> {
    inner: LockedGuard<T, F>,
}

impl<T, F> SealedGuard<T, F> {
    /// Creates an uninitialized guard. Usable in `static` initializers.
    pub const fn new(init: F) -> Self {
        Self {
            inner: LockedGuard::new(init),
        }
    }

    /// Creates an uninitialized guard carrying a diagnostic label.
    pub const fn with_label(label: &'static str, init: F) -> Self {
        Self {
            inner: LockedGuard::with_label(label, init),
        }
    }

    /// Returns the instance if it has been constructed, without locking and
    /// without constructing.
    #[inline]
    pub fn try_get(&self) -> Option<&T> {
        self.inner.try_get()
    }
}

impl<T, F> SealedGuard<T, F>
where
    F: Fn() -> T,
{
    /// Returns the instance, constructing it on the first call.
    ///
    /// Always acquires the guard mutex.
    pub fn get(&self) -> &T {
        let held = self.inner.lock();
        match self.inner.try_get() {
            Some(instance) => instance,
            None => self.inner.construct_held(&held, Strategy::Sealed),
        }
    }

    /// Runs the guarded constructor directly, outside the accessor.
    ///
    /// If no instance exists yet, the new one becomes canonical and is
    /// returned. Otherwise nothing is constructed and the call fails; the
    /// failure signals a misuse, not a transient condition, and should not be
    /// retried.
    pub fn construct(&self) -> GuardResult<&T> {
        let held = self.inner.lock();
        if self.inner.try_get().is_some() {
            let key = self.inner.guard_key();
            observer::duplicate_rejected(&key);
            return Err(GuardError::DuplicateConstruction(key.type_name()));
        }
        Ok(self.inner.construct_held(&held, Strategy::Sealed))
    }

    /// Discards a deserialized candidate and returns the canonical instance.
    ///
    /// Never fails. If nothing has accessed the guard yet, the canonical
    /// instance is constructed first; the candidate is never promoted.
    pub fn resolve_deserialized(&self, candidate: T) -> &T {
        let canonical = self.get();
        drop(candidate);
        observer::deserialization_resolved(&self.inner.guard_key());
        canonical
    }
}

#[cfg(feature = "serde")]
impl<T, F> SealedGuard<T, F>
where
    T: Serialize + DeserializeOwned,
    F: Fn() -> T,
{
    /// Serializes the canonical instance to JSON bytes.
    pub fn encode(&self) -> GuardResult<Vec<u8>> {
        serde_json::to_vec(self.get()).map_err(|e| GuardError::Encode(e.to_string()))
    }

    /// Decodes bytes into a transient candidate, then resolves it to the
    /// canonical instance.
    ///
    /// The bytes must describe a well-formed `T`; their contents are otherwise
    /// ignored.
    ///
    /// ```rust
    /// use instance_guard::SealedGuard;
    /// use serde::{Deserialize, Serialize};
    ///
    /// #[derive(Serialize, Deserialize)]
    /// struct Ledger {
    ///     entries: Vec<u64>,
    /// }
    ///
    /// static LEDGER: SealedGuard<Ledger> = SealedGuard::new(|| Ledger { entries: vec![1, 2] });
    ///
    /// let bytes = LEDGER.encode().unwrap();
    /// let decoded = LEDGER.decode(&bytes).unwrap();
    /// assert!(std::ptr::eq(decoded, LEDGER.get()));
    ///
    /// assert!(LEDGER.decode(b"not json").is_err());
    /// ```
    pub fn decode(&self, bytes: &[u8]) -> GuardResult<&T> {
        let candidate: T =
            serde_json::from_slice(bytes).map_err(|e| GuardError::Decode(e.to_string()))?;
        Ok(self.resolve_deserialized(candidate))
    }
}

impl<T, F> InstanceGuard for SealedGuard<T, F>
where
    F: Fn() -> T,
{
    type Target = T;

    fn instance(&self) -> &T {
        self.get()
    }

    fn key(&self) -> GuardKey {
        self.inner.guard_key()
    }

    fn strategy(&self) -> Strategy {
        Strategy::Sealed
    }

    fn state(&self) -> InitState {
        InitState::from_populated(self.inner.try_get().is_some())
    }

    fn constructions(&self) -> usize {
        self.inner.constructed_count()
    }
}

impl<T: fmt::Debug, F> fmt::Debug for SealedGuard<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedGuard")
            .field("key", &self.inner.guard_key())
            .field("value", &self.inner.try_get())
            .finish()
    }
}
