//! Time sources.
//!
//! The engine never reads the wall clock directly: every operation takes its
//! notion of "now" from a [`ClockSource`], so the same logic runs against
//! wall-clock time, a ledger-native timestamp, or a fixed instant in tests.
//! There is no mock/live flag anywhere downstream — swapping the clock is
//! the only switch.

use std::sync::atomic::{AtomicU64, Ordering};

/// Supplies the current instant as Unix seconds.
///
/// Implementations must be monotonically non-decreasing across calls for the
/// cycle invariants to hold; both provided clocks are.
pub trait ClockSource: Send + Sync {
    /// Current instant in Unix seconds.
    fn now(&self) -> u64;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now(&self) -> u64 {
        // Pre-1970 system clocks clamp to 0 rather than panic.
        chrono::Utc::now().timestamp().max(0) as u64
    }
}

/// Manually driven clock for tests and demo harnesses.
///
/// Starts at a chosen instant; advances only via [`advance`](Self::advance)
/// or [`set`](Self::set).
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    /// Create a clock pinned at `now` Unix seconds.
    pub fn new(now: u64) -> Self {
        Self { now: AtomicU64::new(now) }
    }

    /// Move the clock forward by `secs` seconds.
    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }

    /// Pin the clock to an absolute instant.
    pub fn set(&self, now: u64) {
        self.now.store(now, Ordering::SeqCst);
    }
}

impl ClockSource for FixedClock {
    fn now(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
