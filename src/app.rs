//! Application state for the latest-blocks widget.

use std::time::{Duration, Instant};

use crate::data::duration::format_duration;
use crate::data::{
    project_display_slots, Clock, Denomination, DisplaySlot, FeeUrgency, FreshnessMonitor,
    FreshnessState, MonitorError, SystemClock, TimeFrame, MAX_SLOTS,
};
use crate::source::{BaseFeeStats, DataSource, FeedSnapshot, FeedUpdate};
use crate::ui::Theme;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// Main application state.
pub struct App<C: Clock = SystemClock> {
    pub running: bool,
    pub show_help: bool,

    // Data source
    source: Box<dyn DataSource>,
    pub snapshot: FeedSnapshot,
    pub slots: [DisplaySlot; MAX_SLOTS],
    pub block_lag: Option<u64>,
    pub base_fee_stats: Option<BaseFeeStats>,
    pub load_error: Option<String>,
    pub last_updated: Option<Instant>,

    // Freshness
    pub monitor: FreshnessMonitor<C>,

    // Display options
    pub unit: Denomination,
    pub time_frame: TimeFrame,
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App<SystemClock> {
    /// Create an app on the system clock with an auto-detected theme.
    pub fn new(
        source: Box<dyn DataSource>,
        monitor: FreshnessMonitor<SystemClock>,
        unit: Denomination,
        time_frame: TimeFrame,
    ) -> Self {
        Self::with_theme(source, monitor, unit, time_frame, Theme::auto_detect())
    }
}

impl<C: Clock> App<C> {
    /// Create an app with an explicit theme.
    pub fn with_theme(
        source: Box<dyn DataSource>,
        monitor: FreshnessMonitor<C>,
        unit: Denomination,
        time_frame: TimeFrame,
        theme: Theme,
    ) -> Self {
        let snapshot = FeedSnapshot::NotLoaded;
        Self {
            running: true,
            show_help: false,
            source,
            slots: project_display_slots(&snapshot),
            snapshot,
            block_lag: None,
            base_fee_stats: None,
            load_error: None,
            last_updated: None,
            monitor,
            unit,
            time_frame,
            theme,
            status_message: None,
        }
    }

    /// Start the freshness timer. Requires a tokio runtime.
    pub fn start(&mut self) -> Result<(), MonitorError> {
        self.monitor.start()
    }

    /// Stop the freshness timer and leave the main loop.
    pub fn quit(&mut self) {
        self.monitor.dispose();
        self.running = false;
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Current freshness of the feed.
    pub fn freshness(&self) -> FreshnessState {
        self.monitor.state()
    }

    /// Configured stale threshold, e.g. `30m`.
    pub fn stale_after_label(&self) -> String {
        format_duration(self.monitor.stale_after())
    }

    /// Urgency hint for the base fee column.
    pub fn fee_urgency(&self) -> FeeUrgency {
        FeeUrgency::classify(self.base_fee_stats.as_ref(), self.time_frame)
    }

    /// Poll the data source and apply any new update.
    ///
    /// Returns whether an update was applied.
    pub fn reload_data(&mut self) -> bool {
        let update = self.source.poll();
        self.load_error = self.source.error().map(str::to_string);

        match update {
            Some(update) => {
                self.apply_update(update);
                true
            }
            None => false,
        }
    }

    /// Apply a decoded update from upstream.
    pub fn apply_update(&mut self, update: FeedUpdate) {
        let snapshot = update.snapshot();
        self.monitor.observe(&snapshot);

        if snapshot != self.snapshot {
            self.slots = project_display_slots(&snapshot);
            self.snapshot = snapshot;
        }

        self.block_lag = update.block_lag;
        self.base_fee_stats = update.base_fee_per_gas_stats;
        self.last_updated = Some(Instant::now());
    }

    /// Switch between native and fiat fee display.
    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggle();
        self.set_status_message(format!("Fees in {}", self.unit.label()));
    }

    /// Cycle the time frame used for the base fee hint.
    pub fn cycle_time_frame(&mut self) {
        self.time_frame = self.time_frame.next();
        self.set_status_message(format!("Time frame: {}", self.time_frame.label()));
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ManualClock, SlotContent, SlotKey, Thresholds};
    use crate::source::{BlockFeeRecord, ChannelSource, TimeFrameStats};
    use chrono::{TimeZone, Utc};
    use tokio::sync::watch;

    fn test_app() -> (watch::Sender<FeedUpdate>, ManualClock, App<ManualClock>) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        let monitor = FreshnessMonitor::with_clock(clock.clone(), Thresholds::default());
        let (tx, source) = ChannelSource::create("test");
        let app = App::with_theme(
            Box::new(source),
            monitor,
            Denomination::Native,
            TimeFrame::M5,
            Theme::dark(),
        );
        (tx, clock, app)
    }

    fn update(clock: &ManualClock, numbers: &[u64]) -> FeedUpdate {
        let records = numbers
            .iter()
            .enumerate()
            .map(|(i, &number)| BlockFeeRecord {
                number,
                mined_at: clock.now() - chrono::Duration::seconds(12 * (i as i64 + 1)),
                base_fee_per_gas: Some(20e9),
                fees: Some(2e17),
                fees_usd: Some(600.0),
            })
            .collect();
        FeedUpdate {
            latest_block_fees: Some(records),
            block_lag: Some(3),
            base_fee_per_gas_stats: None,
        }
    }

    #[test]
    fn test_starts_with_placeholders() {
        let (_tx, _clock, app) = test_app();
        assert!(app.slots.iter().all(|s| s.is_placeholder()));
        assert_eq!(app.freshness(), FreshnessState::default());
        assert!(app.block_lag.is_none());
    }

    #[test]
    fn test_reload_applies_update() {
        let (tx, clock, mut app) = test_app();

        // Initial empty value from the channel
        assert!(app.reload_data());
        assert!(app.slots[0].is_placeholder());

        tx.send(update(&clock, &[101, 100])).unwrap();
        assert!(app.reload_data());

        assert_eq!(app.slots[0].key, SlotKey::Block(101));
        assert_eq!(app.slots[2].content, SlotContent::Unset);
        assert_eq!(app.block_lag, Some(3));
        assert_eq!(app.freshness().elapsed_seconds, Some(12));

        assert!(!app.reload_data());
    }

    #[test]
    fn test_fee_urgency_follows_time_frame() {
        let (_tx, clock, mut app) = test_app();
        let mut upd = update(&clock, &[1]);
        upd.base_fee_per_gas_stats = Some(BaseFeeStats {
            barrier: 30.0,
            m5: Some(TimeFrameStats { average: 45e9 }),
            h1: Some(TimeFrameStats { average: 10e9 }),
            ..BaseFeeStats::default()
        });
        app.apply_update(upd);

        assert_eq!(app.fee_urgency(), FeeUrgency::Elevated);
        app.cycle_time_frame();
        assert_eq!(app.time_frame, TimeFrame::H1);
        assert_eq!(app.fee_urgency(), FeeUrgency::Normal);
    }

    #[test]
    fn test_toggle_unit_sets_status() {
        let (_tx, _clock, mut app) = test_app();
        app.toggle_unit();
        assert_eq!(app.unit, Denomination::Fiat);
        assert_eq!(app.get_status_message(), Some("Fees in USD"));
    }

    #[test]
    fn test_stale_after_label() {
        let (_tx, _clock, app) = test_app();
        assert_eq!(app.stale_after_label(), "30m");

        let thresholds = Thresholds {
            stale_after: Duration::from_secs(90),
            ..Thresholds::default()
        };
        let (_tx, source) = ChannelSource::create("test");
        let app = App::with_theme(
            Box::new(source),
            FreshnessMonitor::with_clock(ManualClock::new(Utc::now()), thresholds),
            Denomination::Native,
            TimeFrame::M5,
            Theme::dark(),
        );
        assert_eq!(app.stale_after_label(), "90s");
    }

    #[test]
    fn test_quit_disposes_monitor() {
        let (_tx, _clock, mut app) = test_app();
        app.quit();
        assert!(!app.running);
        assert!(!app.monitor.is_running());
    }
}
