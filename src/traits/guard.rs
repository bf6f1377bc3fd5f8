//! The common guard interface.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{GuardKey, InitState, Strategy};

/// Shared interface of every runtime guard strategy.
///
/// Lets code stay generic over how the instance is produced: a startup
/// routine can warm up a mixed set of guards, a health check can report on
/// them, and a test can swap a lazy guard for an eager one.
///
/// # Examples
///
/// ```rust
/// use instance_guard::{EagerGuard, HolderGuard, InitState, InstanceGuard, LockedGuard};
///
/// fn warm<G: InstanceGuard>(guard: &G) -> &G::Target {
///     guard.instance()
/// }
///
/// static PORT: EagerGuard<u16> = EagerGuard::new(8080);
/// static HOSTS: HolderGuard<Vec<String>> = HolderGuard::new(|| vec!["a".into(), "b".into()]);
/// static MOTD: LockedGuard<String> = LockedGuard::new(|| "hello".to_string());
///
/// assert_eq!(*warm(&PORT), 8080);
/// assert_eq!(warm(&HOSTS).len(), 2);
/// assert_eq!(warm(&MOTD), "hello");
/// assert_eq!(MOTD.state(), InitState::Initialized);
/// ```
pub trait InstanceGuard {
    /// The guarded type.
    type Target;

    /// Returns the single instance, constructing it first if the strategy is
    /// lazy and nobody has asked yet.
    fn instance(&self) -> &Self::Target;

    /// Identity used in diagnostics.
    fn key(&self) -> GuardKey;

    /// How this guard produces its instance.
    fn strategy(&self) -> Strategy;

    /// Current lifecycle state.
    fn state(&self) -> InitState;

    /// Number of times the constructor has completed. Never more than 1.
    fn constructions(&self) -> usize;

    /// Point-in-time description of this guard.
    fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            key: self.key(),
            strategy: self.strategy(),
            state: self.state(),
            constructions: self.constructions(),
        }
    }
}

/// Description of a guard at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct GuardSnapshot {
    /// Guard identity
    pub key: GuardKey,
    /// Strategy in use
    pub strategy: Strategy,
    /// Lifecycle state when the snapshot was taken
    pub state: InitState,
    /// Completed constructions
    pub constructions: usize,
}
