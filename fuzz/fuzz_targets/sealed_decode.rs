#![no_main]

use instance_guard::{fixed::decode_member, fixed_set, GuardError, SealedGuard};
use libfuzzer_sys::fuzz_target;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
struct Session {
    id: u64,
    tags: Vec<String>,
}

static SESSION: SealedGuard<Session> = SealedGuard::new(|| Session {
    id: 1,
    tags: vec!["canonical".to_string()],
});

fixed_set! {
    enum Mode {
        Instance,
    }
}

fuzz_target!(|data: &[u8]| {
    let canonical = SESSION.get();

    // Whatever the bytes say, decoding yields the canonical instance or a
    // decode error; never a second session.
    match SESSION.decode(data) {
        Ok(resolved) => assert!(std::ptr::eq(resolved, canonical)),
        Err(err) => assert!(matches!(err, GuardError::Decode(_))),
    }

    match decode_member::<Mode>(data) {
        Ok(member) => assert_eq!(*member, Mode::Instance),
        Err(err) => assert!(matches!(err, GuardError::Decode(_) | GuardError::UnknownTag(_))),
    }
});
