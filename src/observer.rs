//! Diagnostic observers for guard lifecycle events.
//!
//! Guards report construction, construction panics, rejected duplicate
//! constructions and resolved deserializations to a process-wide list of
//! observers. When no observer is registered the hooks cost one
//! atomic load.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;

use crate::{GuardKey, Strategy};

static OBSERVERS: RwLock<Vec<Arc<dyn GuardObserver>>> = parking_lot::const_rwlock(Vec::new());
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Observer trait for guard lifecycle events.
///
/// Observers are process-wide: guards live in `static`s, so there is no
/// container to attach them to. Register them once at startup with
/// [`add_observer`].
///
/// # Performance
///
/// Observer calls are made synchronously on the constructing thread while the
/// guard is still uninitialized; other first-time callers wait for them. Keep
/// implementations cheap.
///
/// # Examples
///
/// ```
/// use instance_guard::{add_observer, clear_observers, GuardKey, GuardObserver, LockedGuard, Strategy};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct StartupTrace {
///     run_id: String,
/// }
///
/// impl GuardObserver for StartupTrace {
///     fn constructing(&self, key: &GuardKey, strategy: Strategy) {
///         println!("[{}] Constructing {} ({})", self.run_id, key.display_name(), strategy);
///     }
///
///     fn constructed(&self, key: &GuardKey, strategy: Strategy, duration: Duration) {
///         println!("[{}] Constructed {} ({}) in {:?}", self.run_id, key.display_name(), strategy, duration);
///     }
///
///     fn construction_panic(&self, key: &GuardKey, message: &str) {
///         eprintln!("[{}] PANIC in {}: {}", self.run_id, key.display_name(), message);
///     }
/// }
///
/// add_observer(Arc::new(StartupTrace { run_id: "boot-1".to_string() }));
///
/// static NAMES: LockedGuard<Vec<&'static str>> = LockedGuard::new(|| vec!["a", "b"]);
/// assert_eq!(NAMES.get().len(), 2);
/// clear_observers();
/// ```
pub trait GuardObserver: Send + Sync {
    /// Called on the constructing thread right before the constructor runs.
    fn constructing(&self, key: &GuardKey, strategy: Strategy);

    /// Called after the constructor returned and before the instance is
    /// published to other callers.
    ///
    /// # Arguments
    ///
    /// * `key` - The guard that was initialized
    /// * `strategy` - How the guard produced its instance
    /// * `duration` - Time spent inside the constructor
    fn constructed(&self, key: &GuardKey, strategy: Strategy, duration: Duration);

    /// Called when a constructor panics. The panic keeps propagating after
    /// this call and the guard stays uninitialized.
    fn construction_panic(&self, key: &GuardKey, message: &str);

    /// Called when a sealed guard refuses a second construction.
    fn duplicate_rejected(&self, _key: &GuardKey) {}

    /// Called when a deserialized candidate was discarded in favor of the
    /// canonical instance.
    fn deserialization_resolved(&self, _key: &GuardKey) {}
}

/// Registers a process-wide observer.
pub fn add_observer(observer: Arc<dyn GuardObserver>) {
    let mut observers = OBSERVERS.write();
    observers.push(observer);
    ACTIVE.store(true, Ordering::Release);
}

/// Removes every registered observer.
pub fn clear_observers() {
    let mut observers = OBSERVERS.write();
    observers.clear();
    ACTIVE.store(false, Ordering::Release);
}

/// Returns true if any observer is registered.
#[inline]
pub fn has_observers() -> bool {
    ACTIVE.load(Ordering::Acquire)
}

// Observers are cloned out so none runs under the registry lock; an observer
// may itself touch guards or register observers.
fn each_observer(mut f: impl FnMut(&dyn GuardObserver)) {
    if !has_observers() {
        return;
    }
    let observers: Vec<Arc<dyn GuardObserver>> = OBSERVERS.read().iter().cloned().collect();
    for observer in &observers {
        f(observer.as_ref());
    }
}

#[inline]
pub(crate) fn constructing(key: &GuardKey, strategy: Strategy) {
    each_observer(|o| o.constructing(key, strategy));
}

#[inline]
pub(crate) fn constructed(key: &GuardKey, strategy: Strategy, duration: Duration) {
    each_observer(|o| o.constructed(key, strategy, duration));
}

#[inline]
pub(crate) fn construction_panic(key: &GuardKey, message: &str) {
    each_observer(|o| o.construction_panic(key, message));
}

#[inline]
pub(crate) fn duplicate_rejected(key: &GuardKey) {
    each_observer(|o| o.duplicate_rejected(key));
}

#[inline]
pub(crate) fn deserialization_resolved(key: &GuardKey) {
    each_observer(|o| o.deserialization_resolved(key));
}

/// Built-in observer that logs events to stdout.
///
/// Useful during development. For production, forward events into your own
/// logging stack or enable the `tracing` feature and use `TracingObserver`.
///
/// # Examples
///
/// ```
/// use instance_guard::{add_observer, clear_observers, LoggingObserver};
/// use std::sync::Arc;
///
/// add_observer(Arc::new(LoggingObserver::with_prefix("[boot]")));
/// // Every guard construction is now printed
/// clear_observers();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[instance-guard]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The prefix printed before every line.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl GuardObserver for LoggingObserver {
    fn constructing(&self, key: &GuardKey, strategy: Strategy) {
        println!("{} Constructing: {} ({})", self.prefix, key.display_name(), strategy);
    }

    fn constructed(&self, key: &GuardKey, strategy: Strategy, duration: Duration) {
        println!("{} Constructed: {} ({}) in {:?}",
            self.prefix, key.display_name(), strategy, duration);
    }

    fn construction_panic(&self, key: &GuardKey, message: &str) {
        eprintln!("{} CONSTRUCTION PANIC in {}: {}",
            self.prefix, key.display_name(), message);
    }

    fn duplicate_rejected(&self, key: &GuardKey) {
        eprintln!("{} Duplicate construction rejected: {}", self.prefix, key.display_name());
    }

    fn deserialization_resolved(&self, key: &GuardKey) {
        println!("{} Deserialized copy resolved to canonical: {}", self.prefix, key.display_name());
    }
}

/// Observer that forwards events to `tracing`.
///
/// Construction events are emitted at `DEBUG`, rejected duplicates at `WARN`
/// and constructor panics at `ERROR`, all under the `instance_guard` target.
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

#[cfg(feature = "tracing")]
impl GuardObserver for TracingObserver {
    fn constructing(&self, key: &GuardKey, strategy: Strategy) {
        tracing::debug!(target: "instance_guard", guard = %key, strategy = %strategy, "constructing");
    }

    fn constructed(&self, key: &GuardKey, strategy: Strategy, duration: Duration) {
        tracing::debug!(
            target: "instance_guard",
            guard = %key,
            strategy = %strategy,
            elapsed_us = duration.as_micros() as u64,
            "constructed"
        );
    }

    fn construction_panic(&self, key: &GuardKey, message: &str) {
        tracing::error!(target: "instance_guard", guard = %key, panic = message, "constructor panicked");
    }

    fn duplicate_rejected(&self, key: &GuardKey) {
        tracing::warn!(target: "instance_guard", guard = %key, "duplicate construction rejected");
    }

    fn deserialization_resolved(&self, key: &GuardKey) {
        tracing::debug!(target: "instance_guard", guard = %key, "deserialized copy resolved");
    }
}

/// Observer that counts events.
///
/// Handy in tests and health endpoints: after startup, `constructions()`
/// should equal the number of guards touched and `duplicates()` should be 0.
///
/// # Examples
///
/// ```
/// use instance_guard::{add_observer, clear_observers, HolderGuard, MetricsObserver};
/// use std::sync::Arc;
///
/// let metrics = Arc::new(MetricsObserver::new());
/// add_observer(metrics.clone());
///
/// let guard = HolderGuard::new(|| 7u8);
/// guard.get();
/// guard.get();
/// assert!(metrics.constructions() >= 1);
/// clear_observers();
/// ```
#[derive(Debug, Default)]
pub struct MetricsObserver {
    constructions: AtomicU64,
    panics: AtomicU64,
    duplicates: AtomicU64,
    resolutions: AtomicU64,
    total_construction_nanos: AtomicU64,
}

impl MetricsObserver {
    /// Creates an observer with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed constructions.
    pub fn constructions(&self) -> u64 {
        self.constructions.load(Ordering::Relaxed)
    }

    /// Number of constructor panics.
    pub fn panics(&self) -> u64 {
        self.panics.load(Ordering::Relaxed)
    }

    /// Number of rejected duplicate constructions.
    pub fn duplicates(&self) -> u64 {
        self.duplicates.load(Ordering::Relaxed)
    }

    /// Number of deserialized candidates resolved to a canonical instance.
    pub fn resolutions(&self) -> u64 {
        self.resolutions.load(Ordering::Relaxed)
    }

    /// Total time spent inside constructors.
    pub fn total_construction_time(&self) -> Duration {
        Duration::from_nanos(self.total_construction_nanos.load(Ordering::Relaxed))
    }
}

impl GuardObserver for MetricsObserver {
    fn constructing(&self, _key: &GuardKey, _strategy: Strategy) {}

    fn constructed(&self, _key: &GuardKey, _strategy: Strategy, duration: Duration) {
        self.constructions.fetch_add(1, Ordering::Relaxed);
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        self.total_construction_nanos.fetch_add(nanos, Ordering::Relaxed);
    }

    fn construction_panic(&self, _key: &GuardKey, _message: &str) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }

    fn duplicate_rejected(&self, _key: &GuardKey) {
        self.duplicates.fetch_add(1, Ordering::Relaxed);
    }

    fn deserialization_resolved(&self, _key: &GuardKey) {
        self.resolutions.fetch_add(1, Ordering::Relaxed);
    }
}
