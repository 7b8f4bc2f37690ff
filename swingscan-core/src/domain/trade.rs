//! Trade: one side of a long round-trip produced by the backtest.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeType {
    Buy,
    Sell,
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeType::Buy => f.write_str("BUY"),
            TradeType::Sell => f.write_str("SELL"),
        }
    }
}

/// A BUY opens a position; a SELL closes the most recent open BUY.
///
/// `profit_pct` and `holding_days` are only set on SELL trades. Profit is
/// rounded to two decimals at the point the trade is recorded, so summaries
/// add up exactly what a reader sees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "type")]
    pub trade_type: TradeType,
    pub date: NaiveDate,
    pub price: f64,
    pub profit_pct: Option<f64>,
    pub holding_days: Option<i64>,
    /// Human-readable rationale: confirmations for a BUY, exit rule for a SELL.
    pub reason: String,
}

impl Trade {
    pub fn buy(date: NaiveDate, price: f64, reason: impl Into<String>) -> Self {
        Self {
            trade_type: TradeType::Buy,
            date,
            price,
            profit_pct: None,
            holding_days: None,
            reason: reason.into(),
        }
    }

    pub fn sell(
        date: NaiveDate,
        price: f64,
        profit_pct: f64,
        holding_days: i64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            trade_type: TradeType::Sell,
            date,
            price,
            profit_pct: Some(round2(profit_pct)),
            holding_days: Some(holding_days),
            reason: reason.into(),
        }
    }

    pub fn is_buy(&self) -> bool {
        self.trade_type == TradeType::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.trade_type == TradeType::Sell
    }

    /// Profit formatted the way reports show it, e.g. `-5.00%`.
    pub fn profit_label(&self) -> Option<String> {
        self.profit_pct.map(|p| format!("{p:.2}%"))
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Action recommended for the final bar of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

impl From<TradeType> for SignalAction {
    fn from(t: TradeType) -> Self {
        match t {
            TradeType::Buy => SignalAction::Buy,
            TradeType::Sell => SignalAction::Sell,
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalAction::Buy => f.write_str("BUY"),
            SignalAction::Sell => f.write_str("SELL"),
            SignalAction::Hold => f.write_str("HOLD"),
        }
    }
}

/// Today's signal with the reason behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaySignal {
    pub action: SignalAction,
    pub reason: String,
}

impl TodaySignal {
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: SignalAction::Hold,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    #[test]
    fn sell_rounds_profit_and_formats_label() {
        let t = Trade::sell(d(10), 95.0, -5.0, 1, "stop-loss");
        assert_eq!(t.profit_pct, Some(-5.0));
        assert_eq!(t.profit_label().as_deref(), Some("-5.00%"));
        assert!(t.is_sell());
    }

    #[test]
    fn buy_has_no_profit_fields() {
        let t = Trade::buy(d(1), 100.0, "entry");
        assert!(t.is_buy());
        assert!(t.profit_pct.is_none());
        assert!(t.holding_days.is_none());
        assert!(t.profit_label().is_none());
    }

    #[test]
    fn round2_rounds_half_away_from_zero() {
        assert_eq!(round2(1.005_1), 1.01);
        assert_eq!(round2(-2.344), -2.34);
    }

    #[test]
    fn trade_type_serializes_upper_case() {
        let json = serde_json::to_string(&Trade::buy(d(2), 10.0, "x")).unwrap();
        assert!(json.contains("\"type\":\"BUY\""));
    }
}
