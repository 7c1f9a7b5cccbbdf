//! Time sources for the assembler.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic and wall-clock time capability.
pub trait Clock {
    /// Monotonic nanoseconds from an arbitrary fixed origin.
    fn monotonic_ns(&self) -> i64;

    /// Nanoseconds since the Unix epoch.
    fn unix_time_ns(&self) -> i64;
}

/// Process clock backed by `Instant` and `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

fn process_origin() -> Instant {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    *ORIGIN.get_or_init(Instant::now)
}

impl Clock for SystemClock {
    fn monotonic_ns(&self) -> i64 {
        process_origin().elapsed().as_nanos() as i64
    }

    fn unix_time_ns(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0)
    }
}

/// Hand-driven clock for deterministic tests and replays.
///
/// Both readings are set explicitly; nothing advances on its own.
#[derive(Debug, Default)]
pub struct ManualClock {
    monotonic_ns: AtomicI64,
    unix_time_ns: AtomicI64,
}

impl ManualClock {
    pub fn new(monotonic_ns: i64, unix_time_ns: i64) -> Self {
        Self {
            monotonic_ns: AtomicI64::new(monotonic_ns),
            unix_time_ns: AtomicI64::new(unix_time_ns),
        }
    }

    pub fn set_monotonic_ns(&self, ns: i64) {
        self.monotonic_ns.store(ns, Ordering::Relaxed);
    }

    pub fn set_unix_time_ns(&self, ns: i64) {
        self.unix_time_ns.store(ns, Ordering::Relaxed);
    }

    /// Move both readings forward by `delta_ns`.
    pub fn advance(&self, delta_ns: i64) {
        self.monotonic_ns.fetch_add(delta_ns, Ordering::Relaxed);
        self.unix_time_ns.fetch_add(delta_ns, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn monotonic_ns(&self) -> i64 {
        self.monotonic_ns.load(Ordering::Relaxed)
    }

    fn unix_time_ns(&self) -> i64 {
        self.unix_time_ns.load(Ordering::Relaxed)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn monotonic_ns(&self) -> i64 {
        (**self).monotonic_ns()
    }

    fn unix_time_ns(&self) -> i64 {
        (**self).unix_time_ns()
    }
}
