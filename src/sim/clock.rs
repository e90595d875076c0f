//! Injectable time sources for the scheduler.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock instant in whole seconds since the Unix epoch.
pub type Timestamp = i64;

/// A source of "now" for the scheduler.
///
/// The scheduler never reads the system clock directly; it asks its `Clock`.
/// Production code uses [`SystemClock`], tests and the batch simulator use
/// [`ManualClock`] so every cycle is reproducible.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the operating system's wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

/// A clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use grid_dr::sim::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new(100);
/// clock.advance(50);
/// assert_eq!(clock.now(), 150);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Moves the clock to an absolute instant.
    pub fn set(&self, at: Timestamp) {
        self.now.store(at, Ordering::Relaxed);
    }

    /// Moves the clock forward by `secs` (negative values move it back).
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::Relaxed)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_where_told() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now(), 1_000);
    }

    #[test]
    fn manual_clock_set_and_advance() {
        let clock = ManualClock::new(0);
        clock.set(500);
        clock.advance(25);
        assert_eq!(clock.now(), 525);
        clock.advance(-525);
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn clock_by_reference() {
        let clock = ManualClock::new(7);
        let by_ref: &ManualClock = &clock;
        assert_eq!(Clock::now(&by_ref), 7);
    }
}
