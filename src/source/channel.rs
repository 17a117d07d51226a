//! Channel-based data source.
//!
//! Receives feed updates via a tokio watch channel, which keeps only the
//! latest value. Useful when the fetching side lives in the same process
//! and pushes updates as they arrive.

use tokio::sync::watch;

use super::{DataSource, FeedUpdate};

/// A data source that receives feed updates via a watch channel.
///
/// # Example
///
/// ```
/// use blockpulse::ChannelSource;
///
/// let (tx, source) = ChannelSource::create("ultrasound api");
/// ```
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<FeedUpdate>,
    description: String,
    /// Track if we've returned the initial value yet
    initial_returned: bool,
}

impl ChannelSource {
    /// Create a new channel source from the receiving end of a watch channel.
    pub fn new(receiver: watch::Receiver<FeedUpdate>, source_description: &str) -> Self {
        let description = format!("channel: {}", source_description);
        Self {
            receiver,
            description,
            initial_returned: false,
        }
    }

    /// Create a channel pair for pushing updates to a `ChannelSource`.
    ///
    /// The channel starts out holding an empty update, so the first poll
    /// yields a "not loaded" snapshot.
    pub fn create(source_description: &str) -> (watch::Sender<FeedUpdate>, Self) {
        let (tx, rx) = watch::channel(FeedUpdate::default());
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl DataSource for ChannelSource {
    fn poll(&mut self) -> Option<FeedUpdate> {
        if !self.initial_returned {
            self.initial_returned = true;
            self.receiver.mark_changed();
        }

        // A closed sender still leaves the last value readable; it just
        // never changes again.
        if self.receiver.has_changed().unwrap_or(false) {
            Some(self.receiver.borrow_and_update().clone())
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        None
    }
}
