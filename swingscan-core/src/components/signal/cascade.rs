//! EMA cascade crossover detector.
//!
//! Fires only when five conditions hold on the last bar:
//! 1. fast/mid/slow EMAs are stacked (fast > mid > slow, or the reverse)
//! 2. the slow EMA is moving in the stacked direction
//! 3. fast crossed mid within the recency window
//! 4. RSI confirms momentum
//! 5. price has pulled back near the fast or mid EMA
//!
//! Any failed stage yields no signal.

use crate::components::indicator::{align, Indicator};
use crate::data::Interval;
use crate::domain::{closes, Candle};
use crate::error::ScanError;
use crate::indicators::ema::ema_series;
use crate::indicators::Rsi;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Scanner;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeParams {
    pub fast: usize,
    pub mid: usize,
    pub slow: usize,
    pub rsi_period: usize,
    /// Bars back the slow EMA is compared against for trend confirmation.
    pub slope_lookback: usize,
    /// Bars scanned backward for a fresh fast/mid cross.
    pub cross_window: usize,
    pub rsi_floor: f64,
    pub rsi_ceiling: f64,
    /// Maximum relative distance of price from the fast or mid EMA.
    pub proximity: f64,
    pub reward_multiple: f64,
    /// Buffer past the bar's low (bullish) or high (bearish) for the stop.
    pub stop_buffer: f64,
    pub min_bars: usize,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            fast: 9,
            mid: 15,
            slow: 50,
            rsi_period: 14,
            slope_lookback: 3,
            cross_window: 5,
            rsi_floor: 45.0,
            rsi_ceiling: 55.0,
            proximity: 0.015,
            reward_multiple: 2.0,
            stop_buffer: 0.01,
            min_bars: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossoverType {
    Bullish,
    Bearish,
}

impl fmt::Display for CrossoverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossoverType::Bullish => f.write_str("bullish"),
            CrossoverType::Bearish => f.write_str("bearish"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossoverResult {
    pub symbol: String,
    pub price: f64,
    pub fast_ema: f64,
    pub mid_ema: f64,
    pub slow_ema: f64,
    pub crossover_type: CrossoverType,
    pub rationale: String,
    pub rsi: Option<f64>,
    pub stop_loss: Option<f64>,
    pub target: Option<f64>,
}

/// Aligned EMA and RSI columns the detector reads.
struct Columns {
    fast: Vec<Option<f64>>,
    mid: Vec<Option<f64>>,
    slow: Vec<Option<f64>>,
    rsi: Vec<Option<f64>>,
}

#[derive(Debug, Clone)]
pub struct EmaCascade {
    params: CascadeParams,
    interval: Interval,
}

impl EmaCascade {
    pub fn new(params: CascadeParams, interval: Interval) -> Self {
        assert!(
            params.fast >= 1 && params.fast < params.mid && params.mid < params.slow,
            "cascade periods must satisfy 1 <= fast < mid < slow"
        );
        Self { params, interval }
    }

    pub fn default_params() -> Self {
        Self::new(CascadeParams::default(), Interval::FifteenMinute)
    }

    fn columns(&self, candles: &[Candle]) -> Columns {
        let closes = closes(candles);
        let n = candles.len();
        Columns {
            fast: align(&ema_series(&closes, self.params.fast), n),
            mid: align(&ema_series(&closes, self.params.mid), n),
            slow: align(&ema_series(&closes, self.params.slow), n),
            rsi: Rsi::new(self.params.rsi_period).compute_aligned(candles),
        }
    }

    /// Did fast cross mid in the given direction within the recency window?
    fn has_recent_cross(&self, cols: &Columns, last: usize, direction: CrossoverType) -> bool {
        let start = last.saturating_sub(self.params.cross_window).max(1);
        ((start + 1)..=last).rev().any(|i| {
            let (Some(fc), Some(mc), Some(fp), Some(mp)) =
                (cols.fast[i], cols.mid[i], cols.fast[i - 1], cols.mid[i - 1])
            else {
                return false;
            };
            match direction {
                CrossoverType::Bullish => fp <= mp && fc > mc,
                CrossoverType::Bearish => fp >= mp && fc < mc,
            }
        })
    }
}

impl Scanner for EmaCascade {
    type Output = CrossoverResult;

    fn name(&self) -> &str {
        "ema_cascade"
    }

    fn min_bars(&self) -> usize {
        self.params.min_bars
    }

    fn scan(&self, symbol: &str, candles: &[Candle]) -> Result<Option<CrossoverResult>, ScanError> {
        if self.params.rsi_period == 0 {
            return Err(ScanError::ComputationDegenerate(format!(
                "{symbol}: cascade rsi_period must be positive"
            )));
        }
        if candles.len() < self.min_bars().max(2) {
            return Ok(None);
        }
        let p = &self.params;
        let cols = self.columns(candles);
        let last = candles.len() - 1;
        let bar = &candles[last];

        let (Some(fast), Some(mid), Some(slow), Some(rsi)) =
            (cols.fast[last], cols.mid[last], cols.slow[last], cols.rsi[last])
        else {
            return Ok(None);
        };

        // 1. structure
        let direction = if fast > mid && mid > slow {
            CrossoverType::Bullish
        } else if fast < mid && mid < slow {
            CrossoverType::Bearish
        } else {
            return Ok(None);
        };

        // 2. slow EMA slope
        let Some(prev_slow) = last.checked_sub(p.slope_lookback).and_then(|k| cols.slow[k]) else {
            return Ok(None);
        };
        let trending = match direction {
            CrossoverType::Bullish => slow > prev_slow,
            CrossoverType::Bearish => slow < prev_slow,
        };
        if !trending {
            return Ok(None);
        }

        // 3. fresh cross
        if !self.has_recent_cross(&cols, last, direction) {
            return Ok(None);
        }

        // 4. momentum
        let momentum = match direction {
            CrossoverType::Bullish => rsi >= p.rsi_floor,
            CrossoverType::Bearish => rsi <= p.rsi_ceiling,
        };
        if !momentum {
            return Ok(None);
        }

        // 5. pullback proximity
        let price = bar.close;
        let near = |ema: f64| ema > 0.0 && (price - ema).abs() / ema <= p.proximity;
        let mut near_emas = Vec::new();
        if near(fast) {
            near_emas.push(format!("EMA{}", p.fast));
        }
        if near(mid) {
            near_emas.push(format!("EMA{}", p.mid));
        }
        if near_emas.is_empty() {
            return Ok(None);
        }

        let stop_loss = match direction {
            CrossoverType::Bullish => slow.min(bar.low * (1.0 - p.stop_buffer)),
            CrossoverType::Bearish => slow.max(bar.high * (1.0 + p.stop_buffer)),
        };
        let risk = (price - stop_loss).abs();
        let target = match direction {
            CrossoverType::Bullish => price + risk * p.reward_multiple,
            CrossoverType::Bearish => price - risk * p.reward_multiple,
        };

        let rationale = format!(
            "Recent {direction} EMA cross on {} with {rsi:.1} RSI. Price near {}.",
            self.interval,
            near_emas.join(", ")
        );

        Ok(Some(CrossoverResult {
            symbol: symbol.to_string(),
            price,
            fast_ema: fast,
            mid_ema: mid,
            slow_ema: slow,
            crossover_type: direction,
            rationale,
            rsi: Some(rsi),
            stop_loss: Some(stop_loss),
            target: Some(target),
        }))
    }
}
