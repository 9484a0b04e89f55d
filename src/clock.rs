use bytemuck::{Pod, Zeroable};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock instant with nanosecond precision.
///
/// The all-zero value means "unknown": a failed clock read degrades to it
/// instead of failing the caller. Consumers must read it as "no timestamp",
/// never as the epoch.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Timestamp {
    pub sec: u64,
    pub nsec: u64,
}

impl Timestamp {
    pub const UNKNOWN: Timestamp = Timestamp { sec: 0, nsec: 0 };

    pub fn new(sec: u64, nsec: u64) -> Self {
        Self { sec, nsec }
    }

    #[inline(always)]
    pub fn is_unknown(&self) -> bool {
        self.sec == 0 && self.nsec == 0
    }

    #[inline(always)]
    pub fn as_nanos(&self) -> i64 {
        (self.sec as i64) * 1_000_000_000 + self.nsec as i64
    }

    /// Nanoseconds elapsed since `earlier`. Negative if the clock stepped
    /// backwards between the two reads.
    #[inline(always)]
    pub fn nanos_since(&self, earlier: Timestamp) -> i64 {
        self.as_nanos() - earlier.as_nanos()
    }
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// System wall clock. A read failure degrades to `Timestamp::UNKNOWN`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => Timestamp {
                sec: d.as_secs(),
                nsec: d.subsec_nanos() as u64,
            },
            Err(_) => Timestamp::UNKNOWN,
        }
    }
}

/// Manually driven clock for tests and simulation harnesses.
///
/// Clones share the same underlying cell, so a harness keeps one handle and
/// hands another to the tracer. Single-threaded, like the tracer itself.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Timestamp>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ts: Timestamp) {
        self.now.set(ts);
    }

    pub fn advance_nanos(&self, nanos: u64) {
        let t = self.now.get();
        let total = t.nsec + nanos;
        self.now.set(Timestamp {
            sec: t.sec + total / 1_000_000_000,
            nsec: total % 1_000_000_000,
        });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_sentinel() {
        assert!(Timestamp::UNKNOWN.is_unknown());
        assert!(!Timestamp::new(1, 0).is_unknown());
        assert!(!Timestamp::new(0, 1).is_unknown());
    }

    #[test]
    fn test_nanos_since() {
        let a = Timestamp::new(10, 500);
        let b = Timestamp::new(11, 200);
        assert_eq!(b.nanos_since(a), 1_000_000_000 - 300);
        assert_eq!(a.nanos_since(b), -(1_000_000_000 - 300));
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.set(Timestamp::new(5, 100));
        assert_eq!(clock.now(), Timestamp::new(5, 100));

        handle.advance_nanos(999_999_950);
        assert_eq!(clock.now(), Timestamp::new(6, 50));
    }

    #[test]
    fn test_system_clock_is_not_unknown() {
        assert!(!SystemClock.now().is_unknown());
    }
}
