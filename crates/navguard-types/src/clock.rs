//! Injected monotonic time source.
//!
//! Every component that measures durations (stuck windows, cache TTLs,
//! recovery ceilings) reads time through a [`Clock`] handle instead of
//! calling `Instant::now()` directly, so tests can drive time forward
//! deterministically with [`ManualClock::advance`] — no sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Shared handle to a clock.
pub type SharedClock = Arc<dyn Clock>;

/// The real wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Construct the default production clock handle.
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}

// ────────────────────────────────────────────────────────────────────────────
// ManualClock
// ────────────────────────────────────────────────────────────────────────────

/// A hand-cranked clock for tests.
///
/// Starts at the construction instant and only moves when
/// [`advance`][ManualClock::advance] is called.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(Instant::now()),
        })
    }

    /// Move the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().expect("manual clock poisoned");
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("manual clock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_stands_still_until_advanced() {
        let clock = ManualClock::new();
        let a = clock.now();
        let b = clock.now();
        assert_eq!(a, b);
    }

    #[test]
    fn manual_clock_advances_by_exact_delta() {
        let clock = ManualClock::new();
        let start = clock.now();
        clock.advance(Duration::from_secs(30));
        assert_eq!(clock.now() - start, Duration::from_secs(30));
    }

    #[test]
    fn manual_clock_is_shareable_across_handles() {
        let clock = ManualClock::new();
        let shared: SharedClock = clock.clone();
        let before = shared.now();
        clock.advance(Duration::from_millis(250));
        assert_eq!(shared.now() - before, Duration::from_millis(250));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
