//! IndicatorFrame: a candle plus every derived indicator value at that bar.
//!
//! Each field is `None` until its warm-up has elapsed. Consumers must treat
//! `None` as "not yet defined", never as zero.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub candle: Candle,
    pub rsi: Option<f64>,
    /// Fast EMA used by the backtest entry rule.
    pub ema_fast: Option<f64>,
    /// Slow EMA used by the backtest entry rule.
    pub ema_slow: Option<f64>,
    /// The configured EMA set keyed by period. Periods still in warm-up are absent.
    pub emas: BTreeMap<usize, f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub atr: Option<f64>,
    pub adx: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_middle: Option<f64>,
    pub bb_lower: Option<f64>,
    pub obv: Option<f64>,
    pub volume_ema: Option<f64>,
    /// Rolling simple average of volume.
    pub avg_volume: Option<f64>,
}

impl IndicatorFrame {
    /// A frame with every derived field undefined.
    pub fn bare(candle: Candle) -> Self {
        Self {
            candle,
            rsi: None,
            ema_fast: None,
            ema_slow: None,
            emas: BTreeMap::new(),
            macd: None,
            macd_signal: None,
            macd_histogram: None,
            atr: None,
            adx: None,
            bb_upper: None,
            bb_middle: None,
            bb_lower: None,
            obv: None,
            volume_ema: None,
            avg_volume: None,
        }
    }

    /// EMA value for `period`, if that period is configured and warmed up.
    pub fn ema(&self, period: usize) -> Option<f64> {
        self.emas.get(&period).copied()
    }

    pub fn close(&self) -> f64 {
        self.candle.close
    }

    pub fn volume(&self) -> f64 {
        self.candle.volume as f64
    }
}
