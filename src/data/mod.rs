//! Data processing for the latest-blocks widget.
//!
//! Everything here works on already-decoded feed data and produces display
//! strings, slots, and flags. Nothing here does I/O.
//!
//! ## Submodules
//!
//! - [`format`]: Denomination-aware formatting with absent-in, absent-out semantics
//! - [`projection`]: Fixed-length display slots built from a [`FeedSnapshot`](crate::source::FeedSnapshot)
//! - [`freshness`]: Age of the newest block and stall detection ([`FreshnessMonitor`])
//! - [`base_fee`]: Urgency hint from upstream base fee statistics
//! - [`clock`]: Wall-clock sources for the monitor
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "1s", "30m")
//!
//! ## Data Flow
//!
//! ```text
//! FeedUpdate (decoded JSON)
//!        │
//!        ├──▶ project_display_slots() ──▶ [DisplaySlot; 20] ──▶ format_gas / format_fee
//!        │
//!        └──▶ FreshnessMonitor::observe() ◀── 1s timer
//!                     │
//!                     ▼
//!             FreshnessState { elapsed_seconds, is_stalled }
//! ```

pub mod base_fee;
pub mod clock;
pub mod duration;
pub mod format;
pub mod freshness;
pub mod projection;

pub use base_fee::{FeeUrgency, TimeFrame};
pub use clock::{Clock, ManualClock, SystemClock};
pub use format::{format_fee, format_gas, Denomination};
pub use freshness::{
    FreshnessMonitor, FreshnessPhase, FreshnessState, MonitorError, Subscription, Thresholds,
};
pub use projection::{project_display_slots, DisplaySlot, SlotContent, SlotKey, MAX_SLOTS};
