//! Initialization strategies and lifecycle states.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Strategy a guard uses to produce its single instance
///
/// Strategies differ in when construction is paid and what synchronization
/// each access costs.
///
/// # Strategy Characteristics
///
/// - **Eager**: built with the guard, accessor is a plain field read
/// - **Locked**: built on first access, every access takes a mutex
/// - **Holder**: built on first access, reads after that are a single atomic load
/// - **FixedSet**: static enum table, no construction at runtime
/// - **Sealed**: locked, plus rejection of duplicate construction and
///   resolution of deserialized copies
///
/// # Examples
///
/// ```rust
/// use instance_guard::{EagerGuard, HolderGuard, InstanceGuard, Strategy};
///
/// static LIMITS: EagerGuard<[u32; 2]> = EagerGuard::new([16, 64]);
/// static TABLE: HolderGuard<Vec<u32>> = HolderGuard::new(|| (0..8).collect());
///
/// assert_eq!(LIMITS.strategy(), Strategy::Eager);
/// assert_eq!(TABLE.strategy(), Strategy::Holder);
/// assert!(!TABLE.strategy().is_eager());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Instance constructed together with the guard
    ///
    /// Construction is paid even if nothing ever reads the instance.
    Eager,
    /// Lazy construction under a mutex held on every access
    ///
    /// The lock stays on the access path after initialization.
    Locked,
    /// Lazy construction through a one-time-initialized holder
    ///
    /// No guard-owned lock. The holder's own exactly-once initialization
    /// serializes concurrent first accesses.
    Holder,
    /// Closed enumeration whose sole member is the instance
    FixedSet,
    /// Locked strategy that also refuses duplicate construction and
    /// resolves deserialized copies to the canonical instance
    Sealed,
}

impl Strategy {
    /// Returns true if the instance exists before the first access.
    pub fn is_eager(&self) -> bool {
        matches!(self, Strategy::Eager | Strategy::FixedSet)
    }

    /// Returns true if every access pays for a lock.
    pub fn locks_on_access(&self) -> bool {
        matches!(self, Strategy::Locked | Strategy::Sealed)
    }

    /// Short lowercase name used in logs and snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Eager => "eager",
            Strategy::Locked => "locked",
            Strategy::Holder => "holder",
            Strategy::FixedSet => "fixed-set",
            Strategy::Sealed => "sealed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Lifecycle state of a guarded slot
///
/// `Uninitialized -> Initialized` happens exactly once and is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InitState {
    /// Nothing has been constructed yet
    Uninitialized,
    /// The single instance exists
    Initialized,
}

impl InitState {
    pub(crate) fn from_populated(populated: bool) -> Self {
        if populated {
            InitState::Initialized
        } else {
            InitState::Uninitialized
        }
    }

    /// Returns true once the instance exists.
    pub fn is_initialized(&self) -> bool {
        matches!(self, InitState::Initialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eager_strategies_do_not_lock() {
        for strategy in [Strategy::Eager, Strategy::FixedSet] {
            assert!(strategy.is_eager());
            assert!(!strategy.locks_on_access());
        }
        for strategy in [Strategy::Locked, Strategy::Sealed] {
            assert!(!strategy.is_eager());
            assert!(strategy.locks_on_access());
        }
        assert!(!Strategy::Holder.is_eager());
        assert!(!Strategy::Holder.locks_on_access());
    }

    #[test]
    fn state_from_slot() {
        assert_eq!(InitState::from_populated(false), InitState::Uninitialized);
        assert!(InitState::from_populated(true).is_initialized());
    }

    #[test]
    fn strategy_display_matches_name() {
        assert_eq!(Strategy::FixedSet.to_string(), "fixed-set");
        assert_eq!(format!("{}", Strategy::Sealed), "sealed");
    }
}
