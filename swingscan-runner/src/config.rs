//! TOML scan configuration.
//!
//! Every section and field defaults, so an empty document is a complete
//! config. `validate()` catches values the strategies cannot run with.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use swingscan_core::components::filter::RegimeParams;
use swingscan_core::components::signal::{BullishParams, CascadeParams, ProximityParams};
use swingscan_core::data::Interval;
use swingscan_core::engine::{BacktestParams, IndicatorParams};
use swingscan_core::fingerprint::{content_hash, ContentHash};
use swingscan_core::levels::LevelParams;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    /// Calendar days of daily candles fetched for a signal report.
    pub lookback_days: u32,
    #[serde(flatten)]
    pub params: BacktestParams,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            lookback_days: 360,
            params: BacktestParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BullishSection {
    pub lookback_days: u32,
    /// Maximum bullish results kept after ranking.
    pub top_n: usize,
    #[serde(flatten)]
    pub params: BullishParams,
}

impl Default for BullishSection {
    fn default() -> Self {
        Self {
            lookback_days: 200,
            top_n: 10,
            params: BullishParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximitySection {
    /// Calendar days of history, resampled to weekly bars.
    pub lookback_days: u32,
    #[serde(flatten)]
    pub params: ProximityParams,
}

impl Default for ProximitySection {
    fn default() -> Self {
        Self {
            lookback_days: 1095,
            params: ProximityParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeSection {
    pub interval: Interval,
    /// Defaults to the interval's own lookback when absent.
    pub lookback_days: Option<u32>,
    #[serde(flatten)]
    pub params: CascadeParams,
}

impl CascadeSection {
    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
            .unwrap_or_else(|| self.interval.default_lookback_days())
    }
}

impl Default for CascadeSection {
    fn default() -> Self {
        Self {
            interval: Interval::FifteenMinute,
            lookback_days: None,
            params: CascadeParams::default(),
        }
    }
}

/// Paced batch settings for universe scans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSection {
    /// Instruments processed concurrently per group.
    pub group_size: usize,
    /// Pause between groups, in milliseconds.
    pub pause_ms: u64,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            group_size: 5,
            pause_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub indicators: IndicatorParams,
    pub backtest: BacktestSection,
    pub levels: LevelParams,
    pub bullish: BullishSection,
    pub proximity: ProximitySection,
    pub cascade: CascadeSection,
    pub regime: RegimeParams,
    pub batch: BatchSection,
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ind = &self.indicators;
        nonzero("indicators.rsi_period", ind.rsi_period)?;
        nonzero("indicators.ema_fast", ind.ema_fast)?;
        if ind.ema_fast >= ind.ema_slow {
            return Err(ConfigError::Invalid(format!(
                "indicators.ema_fast ({}) must be below ema_slow ({})",
                ind.ema_fast, ind.ema_slow
            )));
        }
        if ind.ema_periods.contains(&0) {
            return Err(ConfigError::Invalid("indicators.ema_periods contains 0".into()));
        }

        let bt = &self.backtest.params;
        for (name, value) in [
            ("backtest.take_profit_pct", bt.take_profit_pct),
            ("backtest.stop_loss_pct", bt.stop_loss_pct),
            ("backtest.trailing_trigger_pct", bt.trailing_trigger_pct),
            ("backtest.trailing_stop_pct", bt.trailing_stop_pct),
            ("backtest.band_room_pct", bt.band_room_pct),
            ("levels.atr_multiplier", self.levels.atr_multiplier),
            ("levels.reward_multiple", self.levels.reward_multiple),
            ("proximity.threshold_pct", self.proximity.params.threshold_pct),
            ("cascade.proximity", self.cascade.params.proximity),
            ("cascade.stop_buffer", self.cascade.params.stop_buffer),
        ] {
            non_negative(name, value)?;
        }
        if bt.cooldown_days < 0 {
            return Err(ConfigError::Invalid("backtest.cooldown_days is negative".into()));
        }
        nonzero("backtest.lookback_days", self.backtest.lookback_days as usize)?;
        nonzero("levels.swing_window", self.levels.swing_window)?;

        let bullish = &self.bullish.params;
        if bullish.rsi_min > bullish.rsi_max {
            return Err(ConfigError::Invalid("bullish.rsi_min exceeds rsi_max".into()));
        }
        if bullish.threshold > bullish.weights.max_rating() {
            return Err(ConfigError::Invalid(format!(
                "bullish.threshold {} is unreachable (max rating {})",
                bullish.threshold,
                bullish.weights.max_rating()
            )));
        }

        nonzero("proximity.ema_period", self.proximity.params.ema_period)?;

        let cascade = &self.cascade.params;
        if !(cascade.fast < cascade.mid && cascade.mid < cascade.slow) || cascade.fast == 0 {
            return Err(ConfigError::Invalid(format!(
                "cascade periods must increase: {} < {} < {}",
                cascade.fast, cascade.mid, cascade.slow
            )));
        }
        nonzero("cascade.rsi_period", cascade.rsi_period)?;
        nonzero("cascade.slope_lookback", cascade.slope_lookback)?;
        nonzero("cascade.cross_window", cascade.cross_window)?;
        if cascade.rsi_floor > cascade.rsi_ceiling {
            return Err(ConfigError::Invalid("cascade.rsi_floor exceeds rsi_ceiling".into()));
        }

        nonzero("regime.ema_period", self.regime.ema_period)?;
        nonzero("regime.rsi_period", self.regime.rsi_period)?;
        nonzero("regime.trend_bars", self.regime.trend_bars)?;
        nonzero("batch.group_size", self.batch.group_size)?;
        Ok(())
    }

    /// Hash of the canonical JSON form.
    pub fn config_hash(&self) -> Result<ContentHash, ConfigError> {
        content_hash(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn nonzero(name: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be positive")));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid(format!("{name} must be a non-negative number")));
    }
    Ok(())
}
