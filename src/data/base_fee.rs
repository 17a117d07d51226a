//! Base fee urgency hint.
//!
//! Picks the colour of the base fee column from statistics the upstream
//! already aggregated. Nothing is computed here beyond one comparison.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::format::WEI_PER_GWEI;
use crate::source::{BaseFeeStats, TimeFrameStats};

/// Time frame whose statistics drive the urgency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeFrame {
    #[default]
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "7d")]
    D7,
    #[serde(rename = "30d")]
    D30,
    #[serde(rename = "since_burn")]
    SinceBurn,
    #[serde(rename = "since_merge")]
    SinceMerge,
}

impl TimeFrame {
    /// Cycle to the next time frame.
    pub fn next(self) -> Self {
        match self {
            TimeFrame::M5 => TimeFrame::H1,
            TimeFrame::H1 => TimeFrame::D1,
            TimeFrame::D1 => TimeFrame::D7,
            TimeFrame::D7 => TimeFrame::D30,
            TimeFrame::D30 => TimeFrame::SinceBurn,
            TimeFrame::SinceBurn => TimeFrame::SinceMerge,
            TimeFrame::SinceMerge => TimeFrame::M5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::M5 => "5m",
            TimeFrame::H1 => "1h",
            TimeFrame::D1 => "1d",
            TimeFrame::D7 => "7d",
            TimeFrame::D30 => "30d",
            TimeFrame::SinceBurn => "since burn",
            TimeFrame::SinceMerge => "since merge",
        }
    }

    /// The statistics entry for this frame.
    pub fn stats(self, stats: &BaseFeeStats) -> Option<&TimeFrameStats> {
        match self {
            TimeFrame::M5 => stats.m5.as_ref(),
            TimeFrame::H1 => stats.h1.as_ref(),
            TimeFrame::D1 => stats.d1.as_ref(),
            TimeFrame::D7 => stats.d7.as_ref(),
            TimeFrame::D30 => stats.d30.as_ref(),
            TimeFrame::SinceBurn => stats.since_burn.as_ref(),
            TimeFrame::SinceMerge => stats.since_merge.as_ref(),
        }
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(' ', "_").as_str() {
            "5m" | "m5" => Ok(TimeFrame::M5),
            "1h" | "h1" => Ok(TimeFrame::H1),
            "1d" | "d1" => Ok(TimeFrame::D1),
            "7d" | "d7" => Ok(TimeFrame::D7),
            "30d" | "d30" => Ok(TimeFrame::D30),
            "since_burn" => Ok(TimeFrame::SinceBurn),
            "since_merge" => Ok(TimeFrame::SinceMerge),
            other => Err(format!("unknown time frame '{}'", other)),
        }
    }
}

/// How the current base fee level should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeeUrgency {
    /// Average base fee at or below the barrier, or no statistics yet.
    #[default]
    Normal,
    /// Average base fee above the barrier.
    Elevated,
}

impl FeeUrgency {
    /// Classify from the statistics for `frame`.
    ///
    /// Missing statistics, or a missing entry for the frame, fall back to
    /// `Normal`.
    pub fn classify(stats: Option<&BaseFeeStats>, frame: TimeFrame) -> Self {
        let Some(stats) = stats else {
            return FeeUrgency::Normal;
        };
        match frame.stats(stats) {
            Some(entry) if entry.average / WEI_PER_GWEI > stats.barrier => FeeUrgency::Elevated,
            _ => FeeUrgency::Normal,
        }
    }
}
