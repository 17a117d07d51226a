//! Layered configuration for the widget.
//!
//! Sources, lowest priority first: built-in defaults, an optional config
//! file, then `BLOCKPULSE_*` environment variables. Command-line flags are
//! applied on top by the binary.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::{Denomination, Thresholds, TimeFrame};

/// Environment variable prefix, e.g. `BLOCKPULSE_STALE_AFTER=45m`.
pub const ENV_PREFIX: &str = "BLOCKPULSE";

/// Resolved widget settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Age of the newest block after which the feed counts as stalled.
    pub stale_after: String,
    /// Period of the freshness recompute timer.
    pub tick_interval: String,
    /// How often the data source is polled, in seconds.
    pub refresh_secs: u64,
    /// Denomination fees are shown in.
    pub unit: Denomination,
    /// Time frame for the base fee urgency colour.
    pub time_frame: TimeFrame,
}

impl Settings {
    /// Load settings, reading `path` if one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("stale_after", "30m")?
            .set_default("tick_interval", "1s")?
            .set_default("refresh_secs", 1)?
            .set_default("unit", "native")?
            .set_default("time_frame", "5m")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
            .context("invalid configuration")?;
        Ok(settings)
    }

    /// Parse the duration fields into monitor thresholds.
    pub fn thresholds(&self) -> Result<Thresholds> {
        let stale_after = parse_duration(&self.stale_after)
            .with_context(|| format!("invalid stale_after: {}", self.stale_after))?;
        let tick_interval = parse_duration(&self.tick_interval)
            .with_context(|| format!("invalid tick_interval: {}", self.tick_interval))?;
        if tick_interval.is_zero() {
            anyhow::bail!("tick_interval must be greater than zero");
        }
        Ok(Thresholds {
            stale_after,
            tick_interval,
        })
    }

    /// Poll interval for the data source.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}
