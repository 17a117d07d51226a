//! Projection of the block feed onto a fixed set of display slots.
//!
//! The list always has [`MAX_SLOTS`] rows, whether the feed is loading,
//! short, or longer than the list, so the rendered widget never changes
//! shape between updates.

use crate::source::{BlockFeeRecord, FeedSnapshot};

/// Number of rows in the latest-blocks list.
pub const MAX_SLOTS: usize = 20;

/// Stable identity of a display slot across re-projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    /// Slot holds the block with this height.
    Block(u64),
    /// Slot has no block; identified by its row.
    Position(usize),
}

/// What a display slot shows.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    /// A real block.
    Block(BlockFeeRecord),
    /// Data has not loaded yet; render a skeleton.
    Placeholder,
    /// The feed loaded with fewer blocks than there are rows.
    Unset,
}

/// One row of the latest-blocks list.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySlot {
    pub key: SlotKey,
    pub content: SlotContent,
}

impl DisplaySlot {
    fn placeholder(index: usize) -> Self {
        Self {
            key: SlotKey::Position(index),
            content: SlotContent::Placeholder,
        }
    }

    fn unset(index: usize) -> Self {
        Self {
            key: SlotKey::Position(index),
            content: SlotContent::Unset,
        }
    }

    fn block(record: &BlockFeeRecord) -> Self {
        Self {
            key: SlotKey::Block(record.number),
            content: SlotContent::Block(record.clone()),
        }
    }

    /// The block in this slot, if any.
    pub fn record(&self) -> Option<&BlockFeeRecord> {
        match &self.content {
            SlotContent::Block(record) => Some(record),
            SlotContent::Placeholder | SlotContent::Unset => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, SlotContent::Placeholder)
    }
}

/// Project a snapshot onto exactly [`MAX_SLOTS`] display slots.
///
/// A snapshot that has not loaded yields placeholders in every row. A loaded
/// snapshot fills rows with its newest records in order; rows past the end
/// of the feed are [`SlotContent::Unset`].
pub fn project_display_slots(snapshot: &FeedSnapshot) -> [DisplaySlot; MAX_SLOTS] {
    match snapshot {
        FeedSnapshot::NotLoaded => std::array::from_fn(DisplaySlot::placeholder),
        FeedSnapshot::Loaded(records) => std::array::from_fn(|index| match records.get(index) {
            Some(record) => DisplaySlot::block(record),
            None => DisplaySlot::unset(index),
        }),
    }
}
