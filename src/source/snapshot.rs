//! Shared types for feed updates.
//!
//! These types match the JSON produced by the dashboard's grouped-analysis
//! endpoint. They are the common format between whatever fetches the data
//! and this widget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single block with its fee figures.
///
/// Immutable once decoded. Fee fields are optional because the upstream
/// may publish a block before its fee analysis is complete; an absent
/// value is never the same thing as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFeeRecord {
    /// Block height.
    pub number: u64,
    /// When the block was mined.
    pub mined_at: DateTime<Utc>,
    /// Base fee per gas, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fee_per_gas: Option<f64>,
    /// Fees burned in the block, in wei.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<f64>,
    /// Fees burned in the block, in USD.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees_usd: Option<f64>,
}

/// The most recent blocks, newest first, or the fact that none have
/// arrived yet.
///
/// Kept as a tagged variant so every consumer handles the loading branch
/// explicitly instead of checking for an empty list.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedSnapshot {
    /// No data has been received from upstream yet.
    #[default]
    NotLoaded,
    /// Records ordered newest first.
    Loaded(Vec<BlockFeeRecord>),
}

impl FeedSnapshot {
    /// The most recently mined record, if any.
    pub fn newest(&self) -> Option<&BlockFeeRecord> {
        match self {
            FeedSnapshot::NotLoaded => None,
            FeedSnapshot::Loaded(records) => records.first(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, FeedSnapshot::Loaded(_))
    }

    /// Number of records held (zero while not loaded).
    pub fn len(&self) -> usize {
        match self {
            FeedSnapshot::NotLoaded => 0,
            FeedSnapshot::Loaded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Option<Vec<BlockFeeRecord>>> for FeedSnapshot {
    fn from(records: Option<Vec<BlockFeeRecord>>) -> Self {
        match records {
            Some(records) => FeedSnapshot::Loaded(records),
            None => FeedSnapshot::NotLoaded,
        }
    }
}

/// Aggregate base fee statistics for one time frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeFrameStats {
    /// Average base fee per gas over the frame, in wei.
    pub average: f64,
}

/// Base fee statistics per time frame, plus the "ultra sound" barrier.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BaseFeeStats {
    /// Base fee above which issuance is offset by burn, in gwei.
    pub barrier: f64,
    #[serde(default)]
    pub m5: Option<TimeFrameStats>,
    #[serde(default)]
    pub h1: Option<TimeFrameStats>,
    #[serde(default)]
    pub d1: Option<TimeFrameStats>,
    #[serde(default)]
    pub d7: Option<TimeFrameStats>,
    #[serde(default)]
    pub d30: Option<TimeFrameStats>,
    #[serde(default)]
    pub since_burn: Option<TimeFrameStats>,
    #[serde(default)]
    pub since_merge: Option<TimeFrameStats>,
}

/// One decoded message from upstream.
///
/// Each field is independent: a provider may know the block lag before
/// the block list has loaded, or vice versa.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedUpdate {
    /// Latest blocks, newest first. `None` means not yet loaded.
    #[serde(default)]
    pub latest_block_fees: Option<Vec<BlockFeeRecord>>,
    /// Blocks the dashboard is behind the canonical head.
    #[serde(default)]
    pub block_lag: Option<u64>,
    /// Base fee statistics used for the urgency colour.
    #[serde(default)]
    pub base_fee_per_gas_stats: Option<BaseFeeStats>,
}

impl FeedUpdate {
    /// The block list as a tagged snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.latest_block_fees.clone().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deserialize_update() {
        let json = r#"{
            "latestBlockFees": [
                {
                    "number": 17000001,
                    "minedAt": "2023-04-08T12:00:12Z",
                    "baseFeePerGas": 21000000000,
                    "fees": 1500000000000000000,
                    "feesUsd": 2800.5
                },
                {
                    "number": 17000000,
                    "minedAt": "2023-04-08T12:00:00Z",
                    "baseFeePerGas": null
                }
            ],
            "blockLag": 2,
            "baseFeePerGasStats": {
                "barrier": 50.0,
                "m5": { "average": 30000000000 }
            }
        }"#;

        let update: FeedUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.block_lag, Some(2));

        let snapshot = update.snapshot();
        assert_eq!(snapshot.len(), 2);
        let newest = snapshot.newest().unwrap();
        assert_eq!(newest.number, 17_000_001);
        assert_eq!(newest.mined_at, Utc.with_ymd_and_hms(2023, 4, 8, 12, 0, 12).unwrap());
        assert_eq!(newest.base_fee_per_gas, Some(21e9));
        assert_eq!(newest.fees_usd, Some(2800.5));

        let older = &update.latest_block_fees.as_ref().unwrap()[1];
        assert!(older.base_fee_per_gas.is_none());
        assert!(older.fees.is_none());
        assert!(older.fees_usd.is_none());

        let stats = update.base_fee_per_gas_stats.unwrap();
        assert_eq!(stats.barrier, 50.0);
        assert_eq!(stats.m5.unwrap().average, 30e9);
        assert!(stats.d7.is_none());
    }

    #[test]
    fn test_missing_block_list_is_not_loaded() {
        let update: FeedUpdate = serde_json::from_str(r#"{ "blockLag": 0 }"#).unwrap();
        assert_eq!(update.snapshot(), FeedSnapshot::NotLoaded);
        assert_eq!(update.block_lag, Some(0));

        let update: FeedUpdate = serde_json::from_str(r#"{ "latestBlockFees": null }"#).unwrap();
        assert!(!update.snapshot().is_loaded());
    }

    #[test]
    fn test_empty_block_list_is_loaded() {
        let update: FeedUpdate = serde_json::from_str(r#"{ "latestBlockFees": [] }"#).unwrap();
        let snapshot = update.snapshot();
        assert!(snapshot.is_loaded());
        assert!(snapshot.is_empty());
        assert!(snapshot.newest().is_none());
    }
}
