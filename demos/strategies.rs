//! Walks through every guard strategy.
//!
//! Run with `INSTANCE_GUARD_LOG=1` to watch constructions as they happen.

use instance_guard::{
    fixed_set, holder, EagerGuard, FixedSet, GuardConfig, GuardError, HolderGuard, InstanceGuard,
    LockedGuard, SealedGuard,
};
use serde::{Deserialize, Serialize};
use std::thread;

struct Clock {
    tick_ms: u64,
}

struct Inventory {
    items: Vec<&'static str>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user: String,
}

// Built at compile time.
static CLOCK: EagerGuard<Clock> = EagerGuard::new(Clock { tick_ms: 10 });

// Lazy, locked on every access.
static INVENTORY: LockedGuard<Inventory> = LockedGuard::with_label("inventory", || Inventory {
    items: vec!["bolt", "nut", "washer"],
});

// Lazy, lock-free once initialized.
static GREETING: HolderGuard<String> = HolderGuard::new(|| "hello from the holder".to_string());

// Lazy and tamper-resistant.
static SESSION: SealedGuard<Session> = SealedGuard::new(|| Session {
    user: "operator".to_string(),
});

holder! {
    /// Nested-holder accessor: the holder lives inside the function.
    fn motd() -> String = || "message of the day".to_string();
}

fixed_set! {
    /// The enum singleton: its only member is the instance.
    enum Scheduler {
        Instance,
    }
}

impl Scheduler {
    fn schedule(&self, job: &str) -> String {
        format!("scheduled {}", job)
    }
}

fn report<G: InstanceGuard>(name: &str, guard: &G) {
    let snapshot = guard.snapshot();
    println!(
        "{:<10} strategy={:<9} state={:?} constructions={}",
        name, snapshot.strategy, snapshot.state, snapshot.constructions
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GuardConfig::from_env()?;
    config.install();

    println!("== before first access");
    report("clock", &CLOCK);
    report("inventory", &INVENTORY);
    report("greeting", &GREETING);
    report("session", &SESSION);

    println!("== eager");
    println!("tick = {}ms", CLOCK.get().tick_ms);

    println!("== locked, 8 threads");
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| INVENTORY.get() as *const Inventory as usize))
        .collect();
    let addrs: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    println!(
        "all threads saw one instance: {} ({} items)",
        addrs.windows(2).all(|w| w[0] == w[1]),
        INVENTORY.get().items.len()
    );

    println!("== holder");
    println!("{}", *GREETING);
    println!("{}", motd());

    println!("== fixed set");
    let scheduler = Scheduler::instance()?;
    println!("{} ({})", scheduler.schedule("backup"), scheduler);

    println!("== sealed");
    let session = SESSION.get();
    match SESSION.construct() {
        Err(GuardError::DuplicateConstruction(name)) => println!("second construction refused: {}", name),
        other => println!("unexpected: {:?}", other.map(|s| &s.user)),
    }
    let bytes = SESSION.encode()?;
    let decoded = SESSION.decode(&bytes)?;
    println!(
        "round trip kept identity: {} (user {})",
        std::ptr::eq(session, decoded),
        decoded.user
    );

    println!("== after");
    report("inventory", &INVENTORY);
    report("greeting", &GREETING);
    report("session", &SESSION);

    Ok(())
}
