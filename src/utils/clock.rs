//! Time source for every time-dependent decision
//!
//! Policy transitions (lockout expiry, password age, grace logins) and
//! temporal constraints all read the engine clock instead of the system time,
//! so hosts and tests can drive time explicitly.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;

/// Source of the current instant
pub trait Clock: Send + Sync + Debug {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }

    /// Move the clock forward by whole seconds
    pub fn advance_secs(&self, secs: u64) {
        self.advance(seconds(secs));
    }

    /// Jump to an absolute instant
    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock() = to;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

// Largest second count chrono accepts without panicking.
const MAX_SECS: u64 = (i64::MAX / 1_000) as u64;

/// Convert a policy/config second count into a chrono duration, saturating
pub fn seconds(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_SECS) as i64)
}
