//! Market regime classifier.
//!
//! Runs the indicator pipeline on a benchmark series: bullish iff the last
//! close is above the benchmark's EMA, with an UP/DOWN/SIDEWAYS label from a
//! banded comparison against an earlier close. The regime is informational
//! and fails open: when the benchmark cannot be classified the market is
//! treated as bullish/UP so downstream scoring is never blocked.

use crate::domain::Candle;
use crate::engine::pipeline::{compute_frames, IndicatorParams};
use crate::error::ScanError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeParams {
    pub benchmark: String,
    pub lookback_days: u32,
    pub ema_period: usize,
    pub rsi_period: usize,
    /// Bars back the trend comparison looks.
    pub trend_bars: usize,
    /// Percent band around the earlier close inside which the trend is sideways.
    pub trend_band_pct: f64,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self {
            benchmark: "^NSEI".to_string(),
            lookback_days: 100,
            ema_period: 50,
            rsi_period: 14,
            trend_bars: 10,
            trend_band_pct: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Trend {
    Up,
    Down,
    Sideways,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketRegime {
    pub is_bullish: bool,
    pub trend: Trend,
    pub last_close: f64,
    pub ema: Option<f64>,
    pub rsi: Option<f64>,
    pub percent_from_ema: f64,
    /// True when this value is the fail-open default rather than a measurement.
    pub fail_open: bool,
}

impl MarketRegime {
    pub fn fail_open() -> Self {
        Self {
            is_bullish: true,
            trend: Trend::Up,
            last_close: 0.0,
            ema: None,
            rsi: Some(50.0),
            percent_from_ema: 0.0,
            fail_open: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    params: RegimeParams,
}

impl RegimeClassifier {
    pub fn new(params: RegimeParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RegimeParams {
        &self.params
    }

    /// Classify a benchmark series. An empty series is an error; a series too
    /// short for the EMA fails open with the measured close attached.
    pub fn classify(&self, candles: &[Candle]) -> Result<MarketRegime, ScanError> {
        let Some(last_candle) = candles.last() else {
            return Err(ScanError::DataUnavailable {
                symbol: self.params.benchmark.clone(),
                needed: 1,
                available: 0,
            });
        };
        if self.params.ema_period == 0 || self.params.rsi_period == 0 {
            return Err(ScanError::ComputationDegenerate(format!(
                "regime periods must be positive (ema {}, rsi {})",
                self.params.ema_period, self.params.rsi_period
            )));
        }
        let indicators = IndicatorParams {
            rsi_period: self.params.rsi_period,
            ema_periods: vec![self.params.ema_period],
            ..IndicatorParams::default()
        };
        let frames = compute_frames(candles, &indicators);
        let last = frames.len() - 1;
        let close = last_candle.close;
        let rsi = frames[last].rsi;

        let Some(ema) = frames[last].ema(self.params.ema_period).filter(|e| *e > 0.0) else {
            tracing::warn!(
                benchmark = %self.params.benchmark,
                bars = candles.len(),
                "benchmark EMA undefined, regime fails open"
            );
            return Ok(MarketRegime {
                last_close: close,
                rsi,
                ..MarketRegime::fail_open()
            });
        };

        let band = self.params.trend_band_pct / 100.0;
        let trend = match last.checked_sub(self.params.trend_bars) {
            Some(k) if close > candles[k].close * (1.0 + band) => Trend::Up,
            Some(k) if close < candles[k].close * (1.0 - band) => Trend::Down,
            _ => Trend::Sideways,
        };

        Ok(MarketRegime {
            is_bullish: close > ema,
            trend,
            last_close: close,
            ema: Some(ema),
            rsi,
            percent_from_ema: (close - ema) / ema * 100.0,
            fail_open: false,
        })
    }

    /// [`classify`](Self::classify), substituting the fail-open default on error.
    pub fn classify_or_fail_open(&self, candles: &[Candle]) -> MarketRegime {
        self.classify(candles).unwrap_or_else(|e| {
            tracing::warn!(benchmark = %self.params.benchmark, error = %e, "regime fails open");
            MarketRegime::fail_open()
        })
    }
}

impl Default for RegimeClassifier {
    fn default() -> Self {
        Self::new(RegimeParams::default())
    }
}
