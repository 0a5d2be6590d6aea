//! Wall-clock abstraction for testability
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use tabauth_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_millis(1_700_000_000_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now_secs(), 1_700_000_005);
//! ```

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of wall-clock time, in UNIX epoch units
pub trait Clock: Send + Sync {
    /// Milliseconds since the UNIX epoch
    fn now_millis(&self) -> i64;

    /// Whole seconds since the UNIX epoch
    fn now_secs(&self) -> i64 {
        self.now_millis().div_euclid(1_000)
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        // A clock set before 1970 reads as the epoch
        let elapsed = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
        i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same underlying time, so a clone handed to the code under
/// test observes every `advance` made by the test.
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    millis: Arc<AtomicI64>,
}

impl MockClock {
    /// Create a mock clock at the UNIX epoch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock clock reading `millis` since the epoch
    #[must_use]
    pub fn at_millis(millis: i64) -> Self {
        Self { millis: Arc::new(AtomicI64::new(millis)) }
    }

    /// Create a mock clock reading `secs` since the epoch
    #[must_use]
    pub fn at_secs(secs: i64) -> Self {
        Self::at_millis(secs.saturating_mul(1_000))
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        let delta = i64::try_from(duration.as_millis()).unwrap_or(i64::MAX);
        self.advance_millis(delta);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the clock to an absolute epoch time in milliseconds
    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}
