//! Feed freshness tracking.
//!
//! The [`FreshnessMonitor`] derives the age of the newest block it has seen
//! and flags the feed as stalled once that age passes a threshold. It is
//! driven from two directions: [`FreshnessMonitor::observe`] when a new
//! snapshot arrives, and a repeating timer that recomputes the age once per
//! tick. The timer lives in a guard that aborts it when dropped, so the
//! monitor cannot leak it.
//!
//! ```text
//!                observe(first non-empty snapshot)
//!  Uninitialized ───────────────────────────────▶ Tracking(elapsed)
//!                                                   │        ▲
//!                                 elapsed > stale   │        │ newer block
//!                                                   ▼        │
//!                                                  Stalled(elapsed)
//! ```
//!
//! `Stalled` is not a latch: it holds for exactly as long as the newest
//! block is older than the threshold.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::clock::{Clock, SystemClock};
use crate::source::FeedSnapshot;

/// Age after which the feed is considered stalled.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30 * 60);

/// How often the age is recomputed while the timer runs.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Timing settings for a [`FreshnessMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// The feed is stalled while the newest block is older than this.
    pub stale_after: Duration,
    /// Period of the recompute timer.
    pub tick_interval: Duration,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// What consumers of the monitor see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreshnessState {
    /// Age of the newest block in whole seconds, `None` until one is seen.
    pub elapsed_seconds: Option<u64>,
    /// Whether the newest block is older than the stale threshold.
    pub is_stalled: bool,
}

impl FreshnessState {
    /// The state machine phase this state corresponds to.
    pub fn phase(&self) -> FreshnessPhase {
        match self.elapsed_seconds {
            None => FreshnessPhase::Uninitialized,
            Some(elapsed_seconds) if self.is_stalled => FreshnessPhase::Stalled { elapsed_seconds },
            Some(elapsed_seconds) => FreshnessPhase::Tracking { elapsed_seconds },
        }
    }
}

/// Phase of the freshness state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessPhase {
    /// No block has been observed yet.
    Uninitialized,
    /// The newest block is within the stale threshold.
    Tracking { elapsed_seconds: u64 },
    /// The newest block is older than the stale threshold ("resyncing").
    Stalled { elapsed_seconds: u64 },
}

/// Errors from managing the monitor's timer.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("freshness timer is already running")]
    AlreadyRunning,
    #[error("freshness timer requires a tokio runtime: {0}")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// The block the age is measured from.
///
/// The age at the moment of observation comes from the wall clock, because
/// `mined_at` is a real-world timestamp. From then on it is the larger of
/// the monotonic-advanced age and the current wall-clock age, so the age
/// never runs backwards but time the monotonic clock missed is still counted.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    mined_at: DateTime<Utc>,
    age_at_observation: Duration,
    observed_at: Instant,
}

#[derive(Debug)]
struct Tracker<C> {
    clock: C,
    stale_after: Duration,
    anchor: Option<Anchor>,
    state: FreshnessState,
}

impl<C: Clock> Tracker<C> {
    /// Adopt the snapshot's newest block if it is newer than the anchor.
    fn observe(&mut self, snapshot: &FeedSnapshot) -> bool {
        let Some(newest) = snapshot.newest() else {
            return false;
        };

        if let Some(anchor) = &self.anchor {
            if newest.mined_at <= anchor.mined_at {
                return false;
            }
        }

        let age = self.wall_age(newest.mined_at);
        debug!(block = newest.number, age_secs = age.as_secs(), "freshness anchor advanced");

        self.anchor = Some(Anchor {
            mined_at: newest.mined_at,
            age_at_observation: age,
            observed_at: self.clock.monotonic(),
        });
        true
    }

    /// Wall-clock age of a block. A block stamped in the future (clock
    /// skew) counts as zero seconds old.
    fn wall_age(&self, mined_at: DateTime<Utc>) -> Duration {
        (self.clock.now() - mined_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Recompute the state; returns it if it changed.
    fn recompute(&mut self) -> Option<FreshnessState> {
        let anchor = self.anchor?;

        // A forward wall-clock gap (suspend, NTP step) still counts; a
        // backward step cannot rewind the age.
        let counted = anchor.age_at_observation
            + self.clock.monotonic().saturating_duration_since(anchor.observed_at);
        let wall = self.wall_age(anchor.mined_at);
        let age = counted.max(wall);
        let elapsed_seconds = age.as_secs();
        let next = FreshnessState {
            elapsed_seconds: Some(elapsed_seconds),
            is_stalled: Duration::from_secs(elapsed_seconds) > self.stale_after,
        };

        if next == self.state {
            return None;
        }

        if next.is_stalled != self.state.is_stalled {
            if next.is_stalled {
                info!(elapsed_seconds, "feed stalled, upstream appears to be resyncing");
            } else if self.state.elapsed_seconds.is_some() {
                info!(elapsed_seconds, "feed recovered");
            }
        }

        self.state = next;
        Some(next)
    }
}

type Callback = Box<dyn FnMut(FreshnessState) + Send>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    callbacks: BTreeMap<u64, Callback>,
}

impl Subscribers {
    fn notify(&mut self, state: FreshnessState) {
        for callback in self.callbacks.values_mut() {
            callback(state);
        }
    }
}

struct Shared<C> {
    tracker: Mutex<Tracker<C>>,
    subscribers: Arc<Mutex<Subscribers>>,
}

impl<C: Clock> Shared<C> {
    fn update(&self, snapshot: Option<&FeedSnapshot>) -> bool {
        let mut tracker = self.tracker.lock();
        let accepted = snapshot.is_some_and(|s| tracker.observe(s));
        let changed = tracker.recompute();

        // Taking the subscriber lock before releasing the tracker keeps
        // notifications in the order the states were computed.
        let mut subscribers = self.subscribers.lock();
        drop(tracker);

        if let Some(state) = changed {
            subscribers.notify(state);
        }
        accepted
    }
}

/// Handle to a registered callback. Dropping it unsubscribes.
#[must_use = "dropping a Subscription immediately unsubscribes the callback"]
pub struct Subscription {
    id: u64,
    subscribers: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Detach the callback. Equivalent to dropping the handle.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(subscribers) = self.subscribers.upgrade() {
            subscribers.lock().callbacks.remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Owns the running tick task and aborts it when dropped.
#[derive(Debug)]
struct TimerGuard {
    handle: JoinHandle<()>,
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        self.handle.abort();
        debug!("freshness timer stopped");
    }
}

/// Tracks how old the newest block is and whether the feed has stalled.
///
/// Subscriber callbacks run on whichever task drove the update (the timer
/// task for ticks). They must not block and must not call back into the
/// monitor or drop a [`Subscription`], since the subscriber list is locked
/// while they run.
///
/// # Example
///
/// ```
/// use blockpulse::{FeedSnapshot, FreshnessMonitor, Thresholds};
///
/// # tokio_test::block_on(async {
/// let mut monitor = FreshnessMonitor::new(Thresholds::default());
/// let _subscription = monitor.subscribe(|state| {
///     println!("elapsed: {:?}, stalled: {}", state.elapsed_seconds, state.is_stalled);
/// });
/// monitor.start().unwrap();
/// monitor.observe(&FeedSnapshot::NotLoaded);
/// assert!(monitor.state().elapsed_seconds.is_none());
/// monitor.dispose();
/// # });
/// ```
pub struct FreshnessMonitor<C: Clock = SystemClock> {
    shared: Arc<Shared<C>>,
    tick_interval: Duration,
    timer: Option<TimerGuard>,
}

impl FreshnessMonitor<SystemClock> {
    /// Create a monitor on the system clock.
    pub fn new(thresholds: Thresholds) -> Self {
        Self::with_clock(SystemClock, thresholds)
    }
}

impl<C: Clock> FreshnessMonitor<C> {
    /// Create a monitor reading time from `clock`.
    ///
    /// The monitor starts `Uninitialized` with its timer stopped.
    pub fn with_clock(clock: C, thresholds: Thresholds) -> Self {
        Self {
            shared: Arc::new(Shared {
                tracker: Mutex::new(Tracker {
                    clock,
                    stale_after: thresholds.stale_after,
                    anchor: None,
                    state: FreshnessState::default(),
                }),
                subscribers: Arc::new(Mutex::new(Subscribers::default())),
            }),
            tick_interval: thresholds.tick_interval,
            timer: None,
        }
    }

    /// Start the repeating recompute timer.
    ///
    /// Fails with [`MonitorError::AlreadyRunning`] rather than acquiring a
    /// second timer. Must be called from within a tokio runtime.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        if self.timer.is_some() {
            return Err(MonitorError::AlreadyRunning);
        }
        let runtime = tokio::runtime::Handle::try_current()?;

        // The task only holds a weak reference so it never keeps a dropped
        // monitor's state alive.
        let shared = Arc::downgrade(&self.shared);
        let period = self.tick_interval;
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(shared) = shared.upgrade() else {
                    break;
                };
                shared.update(None);
            }
        });

        debug!(period_ms = period.as_millis() as u64, "freshness timer started");
        self.timer = Some(TimerGuard { handle });
        Ok(())
    }

    /// Cancel the timer. Subsequent calls are no-ops until the next `start`.
    pub fn dispose(&mut self) {
        self.timer.take();
    }

    /// Whether the recompute timer is running.
    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Feed a new snapshot to the monitor.
    ///
    /// Only a block strictly newer than the one already tracked moves the
    /// anchor, so a stale snapshot arriving late cannot rewind the age.
    /// Returns whether the snapshot advanced the anchor.
    pub fn observe(&self, snapshot: &FeedSnapshot) -> bool {
        self.shared.update(Some(snapshot))
    }

    /// Recompute the age now, as a timer tick would.
    pub fn tick(&self) {
        self.shared.update(None);
    }

    /// Register a callback invoked with the new state on every change.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(FreshnessState) + Send + 'static,
    {
        let mut subscribers = self.shared.subscribers.lock();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.callbacks.insert(id, Box::new(callback));

        Subscription {
            id,
            subscribers: Arc::downgrade(&self.shared.subscribers),
        }
    }

    /// Current state.
    pub fn state(&self) -> FreshnessState {
        self.shared.tracker.lock().state
    }

    /// Current phase.
    pub fn phase(&self) -> FreshnessPhase {
        self.state().phase()
    }

    /// Age after which the feed counts as stalled.
    pub fn stale_after(&self) -> Duration {
        self.shared.tracker.lock().stale_after
    }

    /// Mining time of the block the age is measured from.
    pub fn tracked_mined_at(&self) -> Option<DateTime<Utc>> {
        self.shared.tracker.lock().anchor.map(|a| a.mined_at)
    }
}

impl<C: Clock> std::fmt::Debug for FreshnessMonitor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FreshnessMonitor")
            .field("state", &self.state())
            .field("tick_interval", &self.tick_interval)
            .field("running", &self.is_running())
            .finish()
    }
}
