//! Entry and exit rules for the long-only swing strategy.
//!
//! Rules read a [`BarInputs`] snapshot: every indicator the rules touch,
//! already unwrapped. A bar that cannot produce a snapshot is unevaluable
//! and skipped by the state machine.

use crate::domain::IndicatorFrame;
use crate::error::{require, ScanError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::backtest::BacktestParams;

/// Bars of RSI history the entry rule compares against.
pub const RSI_HISTORY: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct BarInputs {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub rsi: f64,
    /// RSI one, two and three bars back.
    pub prev_rsi: [f64; RSI_HISTORY],
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub adx: f64,
    pub atr: f64,
    pub bb_upper: f64,
    pub avg_volume: f64,
}

impl BarInputs {
    /// Snapshot bar `i`. Fails if `i` lacks history or any indicator is undefined.
    pub fn gather(frames: &[IndicatorFrame], i: usize) -> Result<Self, ScanError> {
        if i < RSI_HISTORY || i >= frames.len() {
            return Err(ScanError::undefined("rsi_history", i));
        }
        let f = &frames[i];
        let prev = |k: usize| require(frames[i - k].rsi, "rsi", i - k);
        Ok(Self {
            date: f.candle.date,
            close: f.close(),
            volume: f.volume(),
            rsi: require(f.rsi, "rsi", i)?,
            prev_rsi: [prev(1)?, prev(2)?, prev(3)?],
            ema_fast: require(f.ema_fast, "ema_fast", i)?,
            ema_slow: require(f.ema_slow, "ema_slow", i)?,
            macd: require(f.macd, "macd", i)?,
            macd_signal: require(f.macd_signal, "macd_signal", i)?,
            adx: require(f.adx, "adx", i)?,
            atr: require(f.atr, "atr", i)?,
            bb_upper: require(f.bb_upper, "bb_upper", i)?,
            avg_volume: require(f.avg_volume, "avg_volume", i)?,
        })
    }

    fn rsi_rising_3(&self) -> bool {
        let [p1, p2, p3] = self.prev_rsi;
        self.rsi > p1 && p1 > p2 && p2 > p3
    }

    fn rsi_falling(&self) -> bool {
        self.rsi < self.prev_rsi[0]
    }
}

/// Optional entry confirmations; at least one must hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    TrendStrength,
    Volatility,
    VolumeSurge,
    NearUpperBand,
}

impl Confirmation {
    pub const ALL: [Confirmation; 4] = [
        Confirmation::TrendStrength,
        Confirmation::Volatility,
        Confirmation::VolumeSurge,
        Confirmation::NearUpperBand,
    ];

    pub fn holds(self, b: &BarInputs, p: &BacktestParams) -> bool {
        match self {
            Confirmation::TrendStrength => b.adx > p.adx_min,
            Confirmation::Volatility => b.close > 0.0 && b.atr / b.close * 100.0 > p.atr_pct_min,
            Confirmation::VolumeSurge => b.volume > b.avg_volume,
            Confirmation::NearUpperBand => {
                if b.bb_upper <= 0.0 {
                    return false;
                }
                let room_pct = (b.bb_upper - b.close) / b.bb_upper * 100.0;
                (0.0..=p.band_room_pct).contains(&room_pct)
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Confirmation::TrendStrength => "ADX trend strength",
            Confirmation::Volatility => "ATR volatility",
            Confirmation::VolumeSurge => "volume above average",
            Confirmation::NearUpperBand => "close near upper band",
        }
    }
}

/// Core conditions plus the confirmations that held, or `None` when no entry.
pub fn entry_signal(b: &BarInputs, p: &BacktestParams) -> Option<Vec<Confirmation>> {
    let core = b.rsi_rising_3() && b.ema_fast > b.ema_slow && b.macd > b.macd_signal;
    if !core {
        return None;
    }
    let confirmations: Vec<Confirmation> = Confirmation::ALL
        .into_iter()
        .filter(|c| c.holds(b, p))
        .collect();
    (!confirmations.is_empty()).then_some(confirmations)
}

/// Why a position was closed. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    TrailingStop,
    UpperBandReversal,
    OverboughtReversal,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExitReason::StopLoss => "stop-loss",
            ExitReason::TakeProfit => "take-profit",
            ExitReason::TrailingStop => "trailing-stop",
            ExitReason::UpperBandReversal => "upper-band reversal",
            ExitReason::OverboughtReversal => "overbought reversal",
        })
    }
}

/// First exit rule that fires. `peak` must already include this bar's close.
pub fn exit_signal(
    b: &BarInputs,
    entry_price: f64,
    peak: f64,
    p: &BacktestParams,
) -> Option<ExitReason> {
    let change_pct = pct_change(entry_price, b.close);
    let drawdown_pct = pct_change(peak, b.close);

    if change_pct <= -p.stop_loss_pct {
        Some(ExitReason::StopLoss)
    } else if change_pct >= p.take_profit_pct {
        Some(ExitReason::TakeProfit)
    } else if change_pct >= p.trailing_trigger_pct && drawdown_pct <= -p.trailing_stop_pct {
        Some(ExitReason::TrailingStop)
    } else if b.close >= b.bb_upper && b.rsi_falling() {
        Some(ExitReason::UpperBandReversal)
    } else if b.rsi > p.rsi_overbought && b.rsi_falling() {
        Some(ExitReason::OverboughtReversal)
    } else {
        None
    }
}

/// Percent change from `from` to `to`; 0 when `from` is non-positive.
pub fn pct_change(from: f64, to: f64) -> f64 {
    if from <= 0.0 {
        return 0.0;
    }
    (to - from) / from * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs() -> BarInputs {
        BarInputs {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            close: 100.0,
            volume: 1_000.0,
            rsi: 55.0,
            prev_rsi: [54.0, 53.0, 52.0],
            ema_fast: 101.0,
            ema_slow: 99.0,
            macd: 0.5,
            macd_signal: 0.2,
            adx: 10.0,
            atr: 0.5,
            bb_upper: 110.0,
            avg_volume: 2_000.0,
        }
    }

    #[test]
    fn entry_needs_a_confirmation() {
        let p = BacktestParams::default();
        assert_eq!(entry_signal(&inputs(), &p), None);

        let mut b = inputs();
        b.adx = 20.0;
        assert_eq!(entry_signal(&b, &p), Some(vec![Confirmation::TrendStrength]));
    }

    #[test]
    fn entry_needs_strictly_rising_rsi() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.adx = 20.0;
        b.prev_rsi = [54.0, 54.0, 52.0];
        assert_eq!(entry_signal(&b, &p), None);
    }

    #[test]
    fn near_upper_band_means_at_most_one_percent_below() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.bb_upper = 100.5;
        assert!(Confirmation::NearUpperBand.holds(&b, &p));
        b.bb_upper = 102.0;
        assert!(!Confirmation::NearUpperBand.holds(&b, &p));
        b.bb_upper = 99.0;
        assert!(!Confirmation::NearUpperBand.holds(&b, &p));
    }

    #[test]
    fn volatility_uses_atr_percent_of_close() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.atr = 0.8;
        assert!(Confirmation::Volatility.holds(&b, &p));
        b.atr = 0.7;
        assert!(!Confirmation::Volatility.holds(&b, &p));
    }

    #[test]
    fn stop_loss_fires_first() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.close = 95.0;
        assert_eq!(exit_signal(&b, 100.0, 100.0, &p), Some(ExitReason::StopLoss));
    }

    #[test]
    fn take_profit() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.close = 108.0;
        b.bb_upper = 120.0;
        assert_eq!(exit_signal(&b, 100.0, 108.0, &p), Some(ExitReason::TakeProfit));
    }

    #[test]
    fn trailing_stop_needs_trigger_and_drawdown() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.close = 105.5;
        b.bb_upper = 120.0;
        // 7.5% peak, now 5.5% up and 1.86% off peak: hold
        assert_eq!(exit_signal(&b, 100.0, 107.5, &p), None);
        // 7.9% peak, now 5.5% up and 2.2% off peak: exit
        assert_eq!(exit_signal(&b, 100.0, 107.9, &p), Some(ExitReason::TrailingStop));
    }

    #[test]
    fn reversal_exits_need_falling_rsi() {
        let p = BacktestParams::default();
        let mut b = inputs();
        b.bb_upper = 100.0;
        assert_eq!(exit_signal(&b, 99.0, 100.0, &p), None);
        b.rsi = 53.0;
        assert_eq!(exit_signal(&b, 99.0, 100.0, &p), Some(ExitReason::UpperBandReversal));

        let mut b = inputs();
        b.rsi = 72.0;
        b.prev_rsi = [75.0, 70.0, 65.0];
        assert_eq!(exit_signal(&b, 99.0, 100.0, &p), Some(ExitReason::OverboughtReversal));
    }

    #[test]
    fn pct_change_guards_zero_base() {
        assert_eq!(pct_change(0.0, 5.0), 0.0);
        assert_eq!(pct_change(100.0, 95.0), -5.0);
    }
}
