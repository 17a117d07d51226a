//! # blockpulse
//!
//! A terminal widget and library that shows the most recent blocks of a
//! chain together with their fees, and tells the user whether the upstream
//! feed has stalled.
//!
//! Feed updates arrive from a [`DataSource`] (files, channels, network
//! streams). Each update is projected onto a fixed list of twenty display
//! slots, and a [`FreshnessMonitor`] tracks the age of the newest block on a
//! one-second timer, flagging the feed as resyncing once that age passes the
//! stale threshold.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(freshness)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── FileSource | StreamSource | ChannelSource  │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state and user interaction logic
//! - **[`source`]**: Data source abstraction ([`DataSource`] trait) with implementations
//!   for file polling, TCP streams, and channel-based input
//! - **[`data`]**: Slot projection, fee formatting, the freshness monitor, and the
//!   base fee urgency hint
//! - **[`config`]**: Layered settings (defaults, file, environment)
//! - **[`ui`]**: Terminal rendering using ratatui
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a JSON file written by a fetcher
//! blockpulse --file feed.json
//!
//! # Read newline-delimited updates from a TCP endpoint
//! blockpulse --connect localhost:9090
//! ```
//!
//! ### Projection and formatting
//!
//! ```
//! use blockpulse::{format_fee, format_gas, project_display_slots, Denomination, FeedSnapshot};
//!
//! let slots = project_display_slots(&FeedSnapshot::NotLoaded);
//! assert!(slots.iter().all(|slot| slot.is_placeholder()));
//!
//! assert_eq!(format_gas(Some(21e9)).as_deref(), Some("21"));
//! assert_eq!(format_fee(Denomination::Native, Some(1e18), Some(3000.0)).as_deref(), Some("1.00"));
//! assert_eq!(format_gas(None), None);
//! ```
//!
//! ### As a library with channel source
//!
//! ```
//! use blockpulse::{App, ChannelSource, Denomination, FreshnessMonitor, Thresholds, TimeFrame};
//!
//! let (tx, source) = ChannelSource::create("ultrasound api");
//! let monitor = FreshnessMonitor::new(Thresholds::default());
//! let app = App::new(Box::new(source), monitor, Denomination::Native, TimeFrame::M5);
//! ```
//!
//! ### Bridging from a message bus
//!
//! ```no_run
//! use blockpulse::StreamSource;
//! use tokio::sync::mpsc;
//!
//! # tokio_test::block_on(async {
//! let (tx, rx) = mpsc::channel::<Vec<u8>>(16);
//! let source = StreamSource::from_bytes_channel(rx, "websocket");
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{
    format_fee, format_gas, project_display_slots, Clock, Denomination, DisplaySlot, FeeUrgency,
    FreshnessMonitor, FreshnessPhase, FreshnessState, ManualClock, MonitorError, SlotContent,
    SlotKey, Subscription, SystemClock, Thresholds, TimeFrame, MAX_SLOTS,
};
pub use source::{
    BaseFeeStats, BlockFeeRecord, ChannelSource, DataSource, FeedSnapshot, FeedUpdate, FileSource,
    StreamSource, TimeFrameStats,
};
