//! Observed execution of guarded constructors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use crate::observer;
use crate::{GuardKey, Strategy};

/// Runs `init`, reporting it to the registered observers.
///
/// With no observers this is a plain call. A panicking constructor is reported
/// and then resumed unchanged.
pub(crate) fn observed<T, F>(key: GuardKey, strategy: Strategy, init: F) -> T
where
    F: FnOnce() -> T,
{
    if !observer::has_observers() {
        return init();
    }

    observer::constructing(&key, strategy);
    let started = Instant::now();
    match panic::catch_unwind(AssertUnwindSafe(init)) {
        Ok(value) => {
            observer::constructed(&key, strategy, started.elapsed());
            value
        }
        Err(payload) => {
            observer::construction_panic(&key, &panic_message(payload.as_ref()));
            panic::resume_unwind(payload);
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(reentrant) = payload.downcast_ref::<super::ReentrantPanic>() {
        reentrant.to_string()
    } else if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
