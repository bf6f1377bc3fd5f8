//! # instance-guard
//!
//! Concurrency-safe, tamper-resistant singleton guards for Rust.
//!
//! ## Features
//!
//! - **Five strategies**: Eager, Locked, Holder, Fixed-Set and Sealed
//! - **Exactly-once construction**: concurrent first callers share one instance
//! - **Tamper resistance**: duplicate construction is refused and deserialized
//!   copies resolve to the canonical instance
//! - **Re-entry detection**: a constructor that reaches back into its own
//!   guard panics with the full chain instead of deadlocking
//! - **Observers**: process-wide hooks for logging, tracing and metrics
//! - **`static`-friendly**: every guard has a `const` constructor
//!
//! ## Quick Start
//!
//! ```rust
//! use instance_guard::{HolderGuard, InstanceGuard};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! static DATABASE: HolderGuard<Database> = HolderGuard::new(|| Database {
//!     url: "postgres://localhost".to_string(),
//! });
//!
//! let db = DATABASE.get();
//! assert_eq!(db.url, "postgres://localhost");
//! assert!(std::ptr::eq(db, DATABASE.get()));
//! assert_eq!(DATABASE.constructions(), 1);
//! ```
//!
//! ## Choosing a Strategy
//!
//! - **[`EagerGuard`]**: the value can be built in a `const` context, or should
//!   be built up front. Access is a plain read.
//! - **[`LockedGuard`]**: lazy, with a mutex taken on every access. Simple, but
//!   pays for the lock forever.
//! - **[`HolderGuard`]** / [`holder!`]: lazy, lock-free after initialization.
//!   The usual choice.
//! - **[`FixedSet`]** / [`fixed_set!`]: the singleton is the only member of a
//!   closed enum; there is nothing to construct.
//! - **[`SealedGuard`]**: lazy and locked, and the instance must survive direct
//!   construction attempts and serialization round-trips unchanged.
//!
//! ## Tamper Resistance
//!
//! ```rust
//! use instance_guard::{GuardError, SealedGuard};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Registry {
//!     name: String,
//! }
//!
//! static REGISTRY: SealedGuard<Registry> = SealedGuard::new(|| Registry {
//!     name: "main".to_string(),
//! });
//!
//! let original = REGISTRY.get();
//!
//! // Bypassing the accessor cannot produce a second instance.
//! assert!(matches!(REGISTRY.construct(), Err(GuardError::DuplicateConstruction(_))));
//!
//! // Neither can a serialization round-trip.
//! let bytes = REGISTRY.encode().unwrap();
//! let decoded = REGISTRY.decode(&bytes).unwrap();
//! assert!(std::ptr::eq(original, decoded));
//! ```

// Module declarations
pub mod config;
pub mod eager;
pub mod error;
pub mod fixed;
pub mod holder;
pub mod key;
pub mod lifecycle;
pub mod locked;
pub mod observer;
pub mod sealed;
pub mod traits;

// Internal modules
mod internal;

// Re-export core types
pub use config::GuardConfig;
pub use eager::EagerGuard;
pub use error::{GuardError, GuardResult};
pub use fixed::{FixedSet, FixedSetGuard};
pub use holder::HolderGuard;
pub use internal::ReentrantPanic;
pub use key::GuardKey;
pub use lifecycle::{InitState, Strategy};
pub use locked::LockedGuard;
pub use observer::{add_observer, clear_observers, has_observers, GuardObserver, LoggingObserver, MetricsObserver};
pub use sealed::SealedGuard;
pub use traits::{GuardSnapshot, InstanceGuard};

#[cfg(feature = "tracing")]
pub use observer::TracingObserver;

#[doc(hidden)]
pub mod __private {
    #[cfg(feature = "serde")]
    pub use serde;
}
