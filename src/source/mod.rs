//! Feed sources delivering decoded updates to the widget.
//!
//! Fetching, caching and retrying belong to whatever produces the updates.
//! A source only hands over the latest decoded [`FeedUpdate`], whether it
//! arrives over a channel, from a file on disk, or from a network stream.

mod channel;
mod file;
mod snapshot;
mod stream;

pub use channel::ChannelSource;
pub use file::FileSource;
pub use snapshot::{BaseFeeStats, BlockFeeRecord, FeedSnapshot, FeedUpdate, TimeFrameStats};
pub use stream::StreamSource;

use std::fmt::Debug;

/// Trait for receiving feed updates from various sources.
///
/// Sources have latest-value semantics: intermediate updates that were
/// superseded before the consumer polled may be skipped.
///
/// # Example
///
/// ```
/// use blockpulse::{DataSource, FileSource};
///
/// let mut source = FileSource::new("feed.json");
/// if let Some(update) = source.poll() {
///     println!("Got {} blocks", update.snapshot().len());
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Poll for the latest update.
    ///
    /// Returns `Some(update)` if new data is available, `None` otherwise.
    /// This method must not block.
    fn poll(&mut self) -> Option<FeedUpdate>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status bar.
    fn description(&self) -> &str;

    /// The error encountered during the last poll, if any.
    fn error(&self) -> Option<&str>;
}
