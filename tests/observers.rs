//! Observer integration tests
//!
//! Observers are process-wide, so every test here runs serially and clears
//! the registry when done.

use instance_guard::{
    add_observer, clear_observers, has_observers, EagerGuard, GuardKey, GuardObserver, HolderGuard,
    InstanceGuard, LockedGuard, MetricsObserver, SealedGuard, Strategy,
};
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl GuardObserver for RecordingObserver {
    fn constructing(&self, key: &GuardKey, strategy: Strategy) {
        self.events.lock().push(format!("constructing {} {}", key.display_name(), strategy));
    }

    fn constructed(&self, key: &GuardKey, strategy: Strategy, _duration: Duration) {
        self.events.lock().push(format!("constructed {} {}", key.display_name(), strategy));
    }

    fn construction_panic(&self, key: &GuardKey, message: &str) {
        self.events.lock().push(format!("panic {} {}", key.display_name(), message));
    }

    fn duplicate_rejected(&self, key: &GuardKey) {
        self.events.lock().push(format!("duplicate {}", key.display_name()));
    }

    fn deserialization_resolved(&self, key: &GuardKey) {
        self.events.lock().push(format!("resolved {}", key.display_name()));
    }
}

fn with_recorder<F: FnOnce(&RecordingObserver)>(f: F) {
    clear_observers();
    let recorder = Arc::new(RecordingObserver::default());
    add_observer(recorder.clone());
    f(&recorder);
    clear_observers();
}

#[test]
#[serial]
fn test_construction_events_once_per_guard() {
    with_recorder(|recorder| {
        let guard = LockedGuard::with_label("config", || 1u32);
        guard.get();
        guard.get();

        assert_eq!(
            recorder.events(),
            vec![
                "constructing u32[config] locked".to_string(),
                "constructed u32[config] locked".to_string(),
            ]
        );
    });
}

#[test]
#[serial]
fn test_holder_and_eager_report_their_strategy() {
    with_recorder(|recorder| {
        let holder = HolderGuard::new(|| "x".to_string());
        holder.get();
        let _eager = EagerGuard::from_fn(|| 3i64);

        let events = recorder.events();
        assert!(events.contains(&"constructed String holder".to_string()), "{:?}", events);
        assert!(events.contains(&"constructed i64 eager".to_string()), "{:?}", events);
    });
}

#[test]
#[serial]
fn test_eager_factory_reports_its_label() {
    with_recorder(|recorder| {
        let guard = EagerGuard::from_fn_labeled("five", || 5u8);

        assert_eq!(
            recorder.events(),
            vec![
                "constructing u8[five] eager".to_string(),
                "constructed u8[five] eager".to_string(),
            ]
        );
        assert_eq!(guard.snapshot().key.display_name(), "u8[five]");
    });
}

#[test]
#[serial]
fn test_sealed_rejections_and_resolutions_are_reported() {
    with_recorder(|recorder| {
        let guard = SealedGuard::new(|| 10u16);
        guard.get();
        assert!(guard.construct().is_err());
        guard.resolve_deserialized(11);

        assert_eq!(
            recorder.events(),
            vec![
                "constructing u16 sealed".to_string(),
                "constructed u16 sealed".to_string(),
                "duplicate u16".to_string(),
                "resolved u16".to_string(),
            ]
        );
    });
}

#[test]
#[serial]
fn test_constructor_panic_is_reported_and_propagated() {
    with_recorder(|recorder| {
        let guard = HolderGuard::new(|| -> u8 { panic!("disk unavailable") });
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            guard.get();
        }));
        assert!(result.is_err());
        assert_eq!(
            recorder.events(),
            vec![
                "constructing u8 holder".to_string(),
                "panic u8 disk unavailable".to_string(),
            ]
        );
    });
}

#[test]
#[serial]
fn test_metrics_observer_counts() {
    clear_observers();
    let metrics = Arc::new(MetricsObserver::new());
    add_observer(metrics.clone());
    assert!(has_observers());

    let a = LockedGuard::new(|| 1u8);
    let b = HolderGuard::new(|| 2u8);
    let c = SealedGuard::new(|| 3u8);
    a.get();
    b.get();
    c.get();
    let _ = c.construct();
    c.resolve_deserialized(4);

    assert_eq!(metrics.constructions(), 3);
    assert_eq!(metrics.duplicates(), 1);
    assert_eq!(metrics.resolutions(), 1);
    assert_eq!(metrics.panics(), 0);

    clear_observers();
    assert!(!has_observers());
}

#[test]
#[serial]
fn test_no_events_after_clear() {
    clear_observers();
    let metrics = Arc::new(MetricsObserver::new());
    add_observer(metrics.clone());
    clear_observers();

    HolderGuard::new(|| 0u64).get();
    assert_eq!(metrics.constructions(), 0);
}

#[test]
#[serial]
fn test_fixed_set_access_constructs_nothing() {
    use instance_guard::{fixed_set, FixedSet};

    fixed_set! {
        enum Broker {
            Instance,
        }
    }

    clear_observers();
    let metrics = Arc::new(MetricsObserver::new());
    add_observer(metrics.clone());

    let a = Broker::instance().unwrap();
    let b = Broker::instance().unwrap();
    assert!(std::ptr::eq(a, b));
    assert_eq!(metrics.constructions(), 0);

    clear_observers();
}

#[cfg(feature = "tracing")]
mod tracing_events {
    use super::*;
    use instance_guard::{GuardConfig, TracingObserver};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    #[derive(Debug, Clone, PartialEq)]
    struct CapturedEvent {
        level: tracing::Level,
        message: String,
        guard: Option<String>,
    }

    #[derive(Default)]
    struct EventVisitor {
        message: String,
        guard: Option<String>,
    }

    impl Visit for EventVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            match field.name() {
                "message" => self.message = format!("{:?}", value),
                "guard" => self.guard = Some(format!("{:?}", value)),
                _ => {}
            }
        }

        fn record_str(&mut self, field: &Field, value: &str) {
            match field.name() {
                "message" => self.message = value.to_string(),
                "guard" => self.guard = Some(value.to_string()),
                _ => {}
            }
        }
    }

    #[derive(Clone, Default)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if event.metadata().target() != "instance_guard" {
                return;
            }
            let mut visitor = EventVisitor::default();
            event.record(&mut visitor);
            self.events.lock().push(CapturedEvent {
                level: *event.metadata().level(),
                message: visitor.message,
                guard: visitor.guard,
            });
        }
    }

    #[test]
    #[serial]
    fn test_tracing_observer_emits_guard_events() {
        clear_observers();
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());

        tracing::subscriber::with_default(subscriber, || {
            add_observer(Arc::new(TracingObserver));

            let guard = SealedGuard::with_label("traced", || 5u32);
            guard.get();
            assert!(guard.construct().is_err());
        });
        clear_observers();

        let guard_name = format!("{}[traced]", std::any::type_name::<u32>());
        let events = layer.events.lock().clone();
        assert_eq!(
            events,
            vec![
                CapturedEvent {
                    level: tracing::Level::DEBUG,
                    message: "constructing".to_string(),
                    guard: Some(guard_name.clone()),
                },
                CapturedEvent {
                    level: tracing::Level::DEBUG,
                    message: "constructed".to_string(),
                    guard: Some(guard_name.clone()),
                },
                CapturedEvent {
                    level: tracing::Level::WARN,
                    message: "duplicate construction rejected".to_string(),
                    guard: Some(guard_name),
                },
            ]
        );
    }

    #[test]
    #[serial]
    fn test_config_installs_tracing_observer() {
        clear_observers();
        let config = GuardConfig {
            trace_events: true,
            ..GuardConfig::default()
        };
        assert_eq!(config.install(), 1);
        assert!(has_observers());
        clear_observers();
    }
}
