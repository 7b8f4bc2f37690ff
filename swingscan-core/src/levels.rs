//! Level calculator: stop-loss, target and risk/reward from recent swing
//! extrema, the 50-period EMA and ATR.
//!
//! Degenerate inputs never fail; they normalize to zero percentages.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelParams {
    /// Trailing window (bars) for swing extrema, clipped to available history.
    pub swing_window: usize,
    pub atr_multiplier: f64,
    /// Minimum reward expressed as a multiple of risk.
    pub reward_multiple: f64,
    /// Alternative target: swing high scaled by this factor.
    pub swing_high_extension: f64,
}

impl Default for LevelParams {
    fn default() -> Self {
        Self {
            swing_window: 50,
            atr_multiplier: 1.5,
            reward_multiple: 2.0,
            swing_high_extension: 1.05,
        }
    }
}

/// Lowest low and highest high over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingRange {
    pub low: f64,
    pub high: f64,
}

/// Swing extrema over the last `window` candles (clipped to history).
///
/// With fewer than two candles in the window the last candle's own low and
/// high are used. Returns `None` only for an empty series.
pub fn swing_range(candles: &[Candle], window: usize) -> Option<SwingRange> {
    let last = candles.last()?;
    let start = candles.len().saturating_sub(window);
    let recent = &candles[start..];
    if recent.len() < 2 {
        return Some(SwingRange {
            low: last.low,
            high: last.high,
        });
    }
    Some(recent.iter().fold(
        SwingRange {
            low: f64::INFINITY,
            high: f64::NEG_INFINITY,
        },
        |acc, c| SwingRange {
            low: acc.low.min(c.low),
            high: acc.high.max(c.high),
        },
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    pub base_stop_level: f64,
    pub stop_loss: f64,
    pub stop_loss_pct: f64,
    pub target: f64,
    pub target_pct: f64,
    pub risk_reward: f64,
}

impl Levels {
    pub fn zero() -> Self {
        Self {
            base_stop_level: 0.0,
            stop_loss: 0.0,
            stop_loss_pct: 0.0,
            target: 0.0,
            target_pct: 0.0,
            risk_reward: 0.0,
        }
    }
}

pub fn compute_levels(
    last_close: f64,
    swing: SwingRange,
    ema50: f64,
    atr: f64,
    params: &LevelParams,
) -> Levels {
    let base_stop_level = swing.low.max(ema50);
    let stop_loss = (base_stop_level - atr * params.atr_multiplier).max(0.0);
    let risk_amount = (last_close - stop_loss).max(0.0);
    let target = (last_close + params.reward_multiple * risk_amount)
        .max(swing.high * params.swing_high_extension);

    let (stop_loss_pct, target_pct) = if last_close > 0.0 {
        (
            (stop_loss - last_close) / last_close * 100.0,
            (target - last_close) / last_close * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    let denom = last_close - stop_loss;
    let risk_reward = if denom > 0.0 {
        (target - last_close) / denom
    } else {
        0.0
    };

    Levels {
        base_stop_level,
        stop_loss,
        stop_loss_pct,
        target,
        target_pct,
        risk_reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn reference_levels() {
        let swing = SwingRange {
            low: 90.0,
            high: 120.0,
        };
        let l = compute_levels(100.0, swing, 95.0, 2.0, &LevelParams::default());
        assert_approx(l.base_stop_level, 95.0, DEFAULT_EPSILON);
        assert_approx(l.stop_loss, 92.0, DEFAULT_EPSILON);
        assert_approx(l.stop_loss_pct, -8.0, DEFAULT_EPSILON);
        assert_approx(l.target, 126.0, DEFAULT_EPSILON);
        assert_approx(l.target_pct, 26.0, DEFAULT_EPSILON);
        assert_approx(l.risk_reward, 3.25, DEFAULT_EPSILON);
    }

    #[test]
    fn stop_loss_never_negative() {
        let swing = SwingRange { low: 1.0, high: 2.0 };
        let l = compute_levels(1.5, swing, 1.0, 10.0, &LevelParams::default());
        assert_eq!(l.stop_loss, 0.0);
        assert!(l.risk_reward > 0.0);
    }

    #[test]
    fn non_positive_close_gives_zero_percentages() {
        let swing = SwingRange { low: 1.0, high: 2.0 };
        let l = compute_levels(0.0, swing, 1.0, 0.1, &LevelParams::default());
        assert_eq!(l.stop_loss_pct, 0.0);
        assert_eq!(l.target_pct, 0.0);
        assert_eq!(l.risk_reward, 0.0);
    }

    #[test]
    fn stop_above_close_has_zero_risk_reward() {
        let swing = SwingRange { low: 110.0, high: 120.0 };
        let l = compute_levels(100.0, swing, 95.0, 1.0, &LevelParams::default());
        assert!(l.stop_loss > 100.0);
        assert_eq!(l.risk_reward, 0.0);
        assert_approx(l.target, 126.0, DEFAULT_EPSILON);
    }

    #[test]
    fn swing_window_clipped_to_history() {
        let candles = make_candles(&[10.0, 12.0, 11.0]);
        let swing = swing_range(&candles, 50).unwrap();
        assert_eq!(swing.low, 9.0);
        assert_eq!(swing.high, 13.0);
    }

    #[test]
    fn swing_window_uses_trailing_bars_only() {
        let candles = make_candles(&[50.0, 10.0, 11.0, 12.0]);
        // last two candles: (open 10, close 11) and (open 11, close 12)
        let swing = swing_range(&candles, 2).unwrap();
        assert_eq!(swing.low, 9.0);
        assert_eq!(swing.high, 13.0);
    }

    #[test]
    fn single_candle_window_uses_last_candle() {
        let candles = make_candles(&[10.0, 20.0]);
        let swing = swing_range(&candles, 1).unwrap();
        assert_eq!(swing.low, candles[1].low);
        assert_eq!(swing.high, candles[1].high);
        assert!(swing_range(&[], 5).is_none());
    }
}
