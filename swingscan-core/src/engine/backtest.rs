//! Long-only swing backtest over precomputed indicator frames.
//!
//! The run is a left fold of [`step`] over bars: each step takes the
//! current [`PositionState`] and one bar, and yields the next state plus
//! at most one trade. No step reads a frame after the bar it evaluates.

use crate::domain::{IndicatorFrame, SignalAction, TodaySignal, Trade};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::{entry_signal, exit_signal, pct_change, BarInputs, RSI_HISTORY};
use super::state::{OpenPosition, PositionState};
use super::summary::{summarize, BacktestSummary};

pub const NO_TRADES_REASON: &str = "No trades detected by strategy in recent data";
pub const NO_TRADE_TODAY_REASON: &str = "No new trade today based on strategy";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    pub take_profit_pct: f64,
    pub stop_loss_pct: f64,
    /// Gain from entry that arms the trailing stop.
    pub trailing_trigger_pct: f64,
    /// Drawdown from peak that fires the armed trailing stop.
    pub trailing_stop_pct: f64,
    /// Calendar days after an exit during which no entry is taken.
    pub cooldown_days: i64,
    pub adx_min: f64,
    pub atr_pct_min: f64,
    /// Max distance below the upper Bollinger band, in percent.
    pub band_room_pct: f64,
    pub rsi_overbought: f64,
    /// Annual rate the strategy's CAGR is compared against.
    pub reference_rate_pct: f64,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            take_profit_pct: 8.0,
            stop_loss_pct: 3.0,
            trailing_trigger_pct: 5.0,
            trailing_stop_pct: 2.0,
            cooldown_days: 0,
            adx_min: 15.0,
            atr_pct_min: 0.7,
            band_room_pct: 1.0,
            rsi_overbought: 70.0,
            reference_rate_pct: 7.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    pub trades: Vec<Trade>,
    pub summary: Option<BacktestSummary>,
    pub signal: TodaySignal,
    pub open_position: Option<OpenPosition>,
}

/// Advance the position by one bar.
///
/// Bars inside cooldown and bars with any required indicator undefined
/// leave the state untouched. A bar that opens a position is not also
/// checked for exit.
pub fn step(
    state: PositionState,
    frames: &[IndicatorFrame],
    i: usize,
    params: &BacktestParams,
) -> (PositionState, Option<Trade>) {
    let Some(frame) = frames.get(i) else {
        return (state, None);
    };
    let date = frame.candle.date;
    if state.cooling_down(date) {
        return (state, None);
    }
    let state = state.settle(date);

    let bar = match BarInputs::gather(frames, i) {
        Ok(bar) => bar,
        Err(e) => {
            debug!(bar = i, error = %e, "skipping unevaluable bar");
            return (state, None);
        }
    };

    match state {
        PositionState::Long {
            entry_price,
            entry_date,
            peak,
        } => {
            let peak = peak.max(bar.close);
            match exit_signal(&bar, entry_price, peak, params) {
                Some(reason) => {
                    let trade = Trade::sell(
                        date,
                        bar.close,
                        pct_change(entry_price, bar.close),
                        (date - entry_date).num_days(),
                        reason.to_string(),
                    );
                    (after_exit(date, params), Some(trade))
                }
                None => (
                    PositionState::Long {
                        entry_price,
                        entry_date,
                        peak,
                    },
                    None,
                ),
            }
        }
        _ => match entry_signal(&bar, params) {
            Some(confirmations) => {
                let labels: Vec<&str> = confirmations.iter().map(|c| c.label()).collect();
                let reason = format!(
                    "RSI rising, EMA fast above slow, MACD above signal; confirmed by {}",
                    labels.join(", ")
                );
                (
                    PositionState::open(bar.close, date),
                    Some(Trade::buy(date, bar.close, reason)),
                )
            }
            None => (state, None),
        },
    }
}

fn after_exit(date: NaiveDate, params: &BacktestParams) -> PositionState {
    if params.cooldown_days > 0 {
        PositionState::Cooldown {
            until: date + Duration::days(params.cooldown_days),
        }
    } else {
        PositionState::Flat
    }
}

/// Run the strategy over every bar that has enough RSI history.
pub fn run_backtest(frames: &[IndicatorFrame], params: &BacktestParams) -> BacktestOutcome {
    let (state, trades) = (RSI_HISTORY..frames.len()).fold(
        (PositionState::Flat, Vec::new()),
        |(state, mut trades), i| {
            let (next, trade) = step(state, frames, i, params);
            trades.extend(trade);
            (next, trades)
        },
    );

    let open_position = match (state, frames.last()) {
        (
            PositionState::Long {
                entry_price,
                entry_date,
                peak,
            },
            Some(last),
        ) => Some(OpenPosition {
            entry_price,
            entry_date,
            peak,
            last_close: last.close(),
            unrealized_pct: pct_change(entry_price, last.close()),
        }),
        _ => None,
    };

    let signal = match frames.last() {
        Some(last) => today_signal(&trades, last.candle.date),
        None => TodaySignal::hold(NO_TRADES_REASON),
    };

    debug!(
        bars = frames.len(),
        trades = trades.len(),
        open = open_position.is_some(),
        "backtest complete"
    );

    BacktestOutcome {
        summary: summarize(&trades, params.reference_rate_pct),
        trades,
        signal,
        open_position,
    }
}

/// Signal for the final bar: the last trade if it happened on `last_date`, else HOLD.
pub fn today_signal(trades: &[Trade], last_date: NaiveDate) -> TodaySignal {
    let Some(last) = trades.last() else {
        return TodaySignal::hold(NO_TRADES_REASON);
    };
    if last.date != last_date {
        return TodaySignal::hold(NO_TRADE_TODAY_REASON);
    }
    let mut reason = format!(
        "Backtest triggered {} today at {:.2}",
        last.trade_type, last.price
    );
    if let Some(profit) = last.profit_label() {
        reason.push_str(&format!(", Profit: {profit}"));
    }
    reason.push_str(&format!(" ({})", last.reason));
    TodaySignal {
        action: SignalAction::from(last.trade_type),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candle, TradeType};

    fn date(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i as i64)
    }

    /// Frame with every required indicator defined and no entry conditions met.
    fn neutral(i: usize, close: f64) -> IndicatorFrame {
        let mut f = IndicatorFrame::bare(Candle {
            date: date(i),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        });
        f.rsi = Some(50.0);
        f.ema_fast = Some(close * 0.99);
        f.ema_slow = Some(close);
        f.macd = Some(0.0);
        f.macd_signal = Some(0.1);
        f.adx = Some(20.0);
        f.atr = Some(close * 0.01);
        f.bb_upper = Some(close * 1.10);
        f.avg_volume = Some(2_000.0);
        f
    }

    /// Neutral frame turned into a valid entry bar, given the three prior RSIs were flat at 50.
    fn entry(mut f: IndicatorFrame) -> IndicatorFrame {
        let close = f.close();
        f.ema_fast = Some(close * 1.01);
        f.macd = Some(0.2);
        f.macd_signal = Some(0.1);
        f
    }

    fn rising_rsi(frames: &mut [IndicatorFrame], at: usize) {
        frames[at - 2].rsi = Some(51.0);
        frames[at - 1].rsi = Some(52.0);
        frames[at].rsi = Some(53.0);
    }

    #[test]
    fn buy_on_final_bar_signals_buy() {
        let mut frames: Vec<_> = (0..40).map(|i| neutral(i, 100.0)).collect();
        rising_rsi(&mut frames, 39);
        frames[39] = entry(frames[39].clone());

        let out = run_backtest(&frames, &BacktestParams::default());
        assert_eq!(out.trades.len(), 1);
        assert_eq!(out.trades[0].trade_type, TradeType::Buy);
        assert_eq!(out.trades[0].date, date(39));
        assert_eq!(out.signal.action, SignalAction::Buy);
        assert!(out.signal.reason.starts_with("Backtest triggered BUY today at 100.00"));
        assert!(out.summary.is_none());
        let open = out.open_position.unwrap();
        assert_eq!(open.entry_price, 100.0);
        assert_eq!(open.unrealized_pct, 0.0);
    }

    #[test]
    fn stop_loss_round_trip() {
        let mut frames: Vec<_> = (0..6).map(|i| neutral(i, 100.0)).collect();
        rising_rsi(&mut frames, 4);
        frames[4] = entry(frames[4].clone());
        frames[5] = neutral(5, 95.0);

        let out = run_backtest(&frames, &BacktestParams::default());
        assert_eq!(out.trades.len(), 2);
        let sell = &out.trades[1];
        assert_eq!(sell.trade_type, TradeType::Sell);
        assert_eq!(sell.profit_pct, Some(-5.0));
        assert_eq!(sell.holding_days, Some(1));
        assert_eq!(sell.reason, "stop-loss");

        let summary = out.summary.unwrap();
        assert_eq!(summary.total_trades, 1);
        assert_eq!(summary.total_profit_pct, -5.0);
        assert_eq!(out.signal.action, SignalAction::Sell);
        assert!(out.signal.reason.contains("Profit: -5.00%"));
        assert!(out.open_position.is_none());
    }

    #[test]
    fn missing_indicator_skips_bar() {
        let mut frames: Vec<_> = (0..6).map(|i| neutral(i, 100.0)).collect();
        rising_rsi(&mut frames, 4);
        frames[4] = entry(frames[4].clone());
        frames[4].adx = None;
        let out = run_backtest(&frames, &BacktestParams::default());
        assert!(out.trades.is_empty());
        assert_eq!(out.signal, TodaySignal::hold(NO_TRADES_REASON));
    }

    #[test]
    fn cooldown_blocks_reentry() {
        let mut frames: Vec<_> = (0..12).map(|i| neutral(i, 100.0)).collect();
        rising_rsi(&mut frames, 4);
        frames[4] = entry(frames[4].clone());
        frames[5] = neutral(5, 95.0);
        // second setup at bar 9 (4 days after the exit)
        for (i, f) in frames.iter_mut().enumerate().skip(6) {
            *f = neutral(i, 95.0);
        }
        frames[7].rsi = Some(51.0);
        frames[8].rsi = Some(52.0);
        frames[9].rsi = Some(53.0);
        frames[9] = entry(frames[9].clone());

        let free = run_backtest(&frames, &BacktestParams::default());
        assert_eq!(free.trades.len(), 3);
        assert_eq!(free.signal, TodaySignal::hold(NO_TRADE_TODAY_REASON));

        let params = BacktestParams {
            cooldown_days: 5,
            ..Default::default()
        };
        let cooled = run_backtest(&frames, &params);
        assert_eq!(cooled.trades.len(), 2);
    }

    #[test]
    fn today_signal_without_trades_is_hold() {
        assert_eq!(today_signal(&[], date(0)).reason, NO_TRADES_REASON);
        let trades = vec![Trade::buy(date(1), 10.0, "x")];
        assert_eq!(today_signal(&trades, date(2)).action, SignalAction::Hold);
        assert_eq!(today_signal(&trades, date(1)).action, SignalAction::Buy);
    }

    #[test]
    fn empty_frames() {
        let out = run_backtest(&[], &BacktestParams::default());
        assert!(out.trades.is_empty());
        assert_eq!(out.signal.action, SignalAction::Hold);
    }
}
