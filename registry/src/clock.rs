//! # Ledger Time
//!
//! Every timeout and freshness check in the registry compares against "now"
//! as the host ledger sees it at the moment an operation executes. That read
//! goes through the [`Clock`] trait so production code uses the system clock
//! while tests drive time by hand across the two-week recovery window without
//! sleeping through it.
//!
//! Operations must call [`Clock::now`] inside the operation body, never cache
//! the value across calls: a transaction's validity can flip between
//! submission and execution, and the check that matters is the one at commit
//! time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the ledger's current time, in whole seconds since the Unix epoch.
pub trait Clock {
    /// The current ledger timestamp.
    fn now(&self) -> u64;
}

/// Wall-clock time from the operating system.
///
/// A pre-epoch system clock reads as 0, which makes every freshness window
/// appear expired. Conservative failure beats a panic in a library that
/// never gets to choose its host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// A hand-cranked clock for tests.
///
/// Cloning yields a handle to the same instant, so a test can keep one handle
/// and hand the other to the registry, then advance time from outside.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    seconds: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock pinned at the given timestamp.
    pub fn at(seconds: u64) -> Self {
        Self {
            seconds: Arc::new(AtomicU64::new(seconds)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, seconds: u64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }

    /// Pin the clock to an absolute timestamp.
    pub fn set(&self, seconds: u64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.seconds.load(Ordering::SeqCst)
    }
}
