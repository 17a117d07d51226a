//! Wall-clock sources.
//!
//! Block ages are anchored on wall-clock time (a block's `minedAt` is a
//! real-world timestamp) and advanced with monotonic time in between, so a
//! [`Clock`] provides both readings.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// Source of the current time.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Current monotonic reading.
    fn monotonic(&self) -> Instant;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Arc<Mutex<ManualTime>>,
}

#[derive(Debug)]
struct ManualTime {
    wall: DateTime<Utc>,
    origin: Instant,
    offset: Duration,
}

impl ManualClock {
    /// Create a clock reading `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ManualTime {
                wall: start,
                origin: Instant::now(),
                offset: Duration::ZERO,
            })),
        }
    }

    /// Move both wall-clock and monotonic time forward.
    pub fn advance(&self, by: Duration) {
        let mut time = self.inner.lock();
        time.offset += by;
        if let Ok(delta) = chrono::Duration::from_std(by) {
            time.wall += delta;
        }
    }

    /// Set the wall clock without touching monotonic time, as an NTP
    /// correction or manual clock change would.
    pub fn set_wall(&self, wall: DateTime<Utc>) {
        self.inner.lock().wall = wall;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.lock().wall
    }

    fn monotonic(&self) -> Instant {
        let time = self.inner.lock();
        time.origin + time.offset
    }
}
