//! Candle provider trait and structured error types.
//!
//! The CandleProvider trait abstracts over data sources (CSV directories,
//! synthetic series, in-memory fixtures) so scans can swap implementations
//! and mock them in tests.

use crate::domain::Candle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bar interval requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "15m")]
    FifteenMinute,
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1wk")]
    Weekly,
}

impl Interval {
    pub const ALL: [Interval; 4] = [
        Interval::FifteenMinute,
        Interval::Hourly,
        Interval::Daily,
        Interval::Weekly,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Interval::FifteenMinute => "15m",
            Interval::Hourly => "1h",
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }

    pub fn is_intraday(self) -> bool {
        matches!(self, Interval::FifteenMinute | Interval::Hourly)
    }

    /// Calendar days of history worth requesting for a crossover scan.
    pub fn default_lookback_days(self) -> u32 {
        match self {
            Interval::Weekly => 1000,
            Interval::Daily => 365,
            Interval::FifteenMinute | Interval::Hourly => 30,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "15m" | "intraday" => Ok(Interval::FifteenMinute),
            "1h" | "hourly" => Ok(Interval::Hourly),
            "1d" | "daily" => Ok(Interval::Daily),
            "1wk" | "weekly" => Ok(Interval::Weekly),
            other => Err(DataError::Unsupported(format!("interval '{other}'"))),
        }
    }
}

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error in {context}: {message}")]
    Parse { context: String, message: String },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for candle providers.
///
/// An empty `Vec` means "no data" and is not an error: scans skip the
/// instrument. Candles are returned in ascending date order.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch up to `lookback_days` calendar days of candles ending at the
    /// provider's latest bar.
    fn fetch_candles(
        &self,
        symbol: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<Vec<Candle>, DataError>;
}

/// Keep candles dated within `lookback_days` of the last candle.
pub fn trim_to_lookback(candles: Vec<Candle>, lookback_days: u32) -> Vec<Candle> {
    let Some(last) = candles.last().map(|c| c.date) else {
        return candles;
    };
    let cutoff = last - chrono::Duration::days(i64::from(lookback_days));
    candles.into_iter().filter(|c| c.date > cutoff).collect()
}

/// Sort ascending, drop insane candles and duplicate dates (last one wins).
pub fn normalize(mut candles: Vec<Candle>, symbol: &str) -> Vec<Candle> {
    let before = candles.len();
    candles.retain(Candle::is_sane);
    if candles.len() < before {
        tracing::warn!(symbol, dropped = before - candles.len(), "dropped malformed candles");
    }
    candles.sort_by_key(|c| c.date);
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for c in candles {
        match out.last_mut() {
            Some(prev) if prev.date == c.date => *prev = c,
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(day: u32, close: f64) -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100,
        }
    }

    #[test]
    fn interval_parses_labels_and_aliases() {
        assert_eq!("1wk".parse::<Interval>().unwrap(), Interval::Weekly);
        assert_eq!("Daily".parse::<Interval>().unwrap(), Interval::Daily);
        assert_eq!("intraday".parse::<Interval>().unwrap(), Interval::FifteenMinute);
        assert!("5y".parse::<Interval>().is_err());
        for i in Interval::ALL {
            assert_eq!(i.label().parse::<Interval>().unwrap(), i);
        }
    }

    #[test]
    fn interval_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Interval::Hourly).unwrap(), "\"1h\"");
        assert!(Interval::Hourly.is_intraday());
        assert!(!Interval::Weekly.is_intraday());
    }

    #[test]
    fn trim_keeps_trailing_window() {
        let candles: Vec<Candle> = (1..=10).map(|d| candle(d, d as f64)).collect();
        let trimmed = trim_to_lookback(candles, 3);
        let days: Vec<f64> = trimmed.iter().map(|c| c.close).collect();
        assert_eq!(days, vec![8.0, 9.0, 10.0]);
        assert!(trim_to_lookback(Vec::new(), 3).is_empty());
    }

    #[test]
    fn normalize_sorts_dedups_and_drops_insane() {
        let mut bad = candle(2, 5.0);
        bad.high = 1.0;
        let candles = vec![candle(3, 3.0), bad, candle(1, 1.0), candle(3, 3.5)];
        let out = normalize(candles, "TEST");
        let closes: Vec<f64> = out.iter().map(|c| c.close).collect();
        assert_eq!(closes, vec![1.0, 3.5]);
    }
}
