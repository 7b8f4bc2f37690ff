//! Aggregate statistics over a completed trade list.

use crate::domain::{round2, Trade};
use crate::engine::rules::pct_change;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Days per year used to annualize returns.
pub const DAYS_PER_YEAR: f64 = 365.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Completed round-trips, i.e. SELL trades.
    pub total_trades: usize,
    /// Sum of per-trade rounded profit percentages.
    pub total_profit_pct: f64,
    /// CAGR in percent from the first BUY to the last SELL, compounded from
    /// the unrounded trade returns.
    pub annualized_return_pct: f64,
    pub reference_rate_pct: f64,
    pub beats_benchmark: bool,
    pub win_rate_pct: f64,
    pub avg_holding_days: f64,
    pub best_trade_pct: f64,
    pub worst_trade_pct: f64,
}

/// Summarize `trades`. `None` when no round-trip has completed.
pub fn summarize(trades: &[Trade], reference_rate_pct: f64) -> Option<BacktestSummary> {
    let sells: Vec<&Trade> = trades.iter().filter(|t| t.is_sell()).collect();
    if sells.is_empty() {
        return None;
    }
    let profits: Vec<f64> = sells.iter().filter_map(|t| t.profit_pct).collect();
    let total_profit_pct = round2(profits.iter().sum());

    let first_buy = trades.iter().find(|t| t.is_buy()).map(|t| t.date);
    let last_sell = sells.last().map(|t| t.date);
    let annualized_return_pct = match (first_buy, last_sell) {
        (Some(start), Some(end)) => {
            cagr(raw_profits(trades).iter().sum(), start, end) * 100.0
        }
        _ => 0.0,
    };

    let holding: Vec<i64> = sells.iter().filter_map(|t| t.holding_days).collect();
    let avg_holding_days = if holding.is_empty() {
        0.0
    } else {
        holding.iter().sum::<i64>() as f64 / holding.len() as f64
    };

    Some(BacktestSummary {
        total_trades: sells.len(),
        total_profit_pct,
        annualized_return_pct,
        reference_rate_pct,
        beats_benchmark: annualized_return_pct > reference_rate_pct,
        win_rate_pct: win_rate(&profits) * 100.0,
        avg_holding_days,
        best_trade_pct: profits.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        worst_trade_pct: profits.iter().copied().fold(f64::INFINITY, f64::min),
    })
}

/// Round-trip returns before rounding: each SELL against the BUY before it.
/// A SELL with no preceding BUY contributes its recorded profit.
fn raw_profits(trades: &[Trade]) -> Vec<f64> {
    let mut entry = None;
    let mut out = Vec::new();
    for t in trades {
        if t.is_buy() {
            entry = Some(t.price);
        } else if t.is_sell() {
            match entry.take() {
                Some(price) => out.push(pct_change(price, t.price)),
                None => out.extend(t.profit_pct),
            }
        }
    }
    out
}

/// Compound annual growth rate as a fraction.
///
/// `total_profit_pct` is the summed profit over the span `start..end`.
/// Returns 0 for an empty span or a non-positive growth multiplier.
pub fn cagr(total_profit_pct: f64, start: NaiveDate, end: NaiveDate) -> f64 {
    let years = (end - start).num_days() as f64 / DAYS_PER_YEAR;
    let multiplier = 1.0 + total_profit_pct / 100.0;
    if years <= 0.0 || multiplier <= 0.0 {
        return 0.0;
    }
    multiplier.powf(1.0 / years) - 1.0
}

/// Fraction of profits strictly above zero.
pub fn win_rate(profits: &[f64]) -> f64 {
    if profits.is_empty() {
        return 0.0;
    }
    profits.iter().filter(|p| **p > 0.0).count() as f64 / profits.len() as f64
}
