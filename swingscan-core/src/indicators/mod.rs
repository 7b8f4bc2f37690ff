//! Concrete indicator implementations.
//!
//! Every indicator implements [`Indicator`](crate::components::Indicator) and
//! also exposes a free `*_series` function over a plain `f64` slice, which the
//! composed indicators (MACD, ADX) and the detectors reuse.
//!
//! Multi-series indicators (Bollinger, MACD) are exposed as separate named
//! instances per output line, keeping the single-series trait unchanged.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod obv;
pub mod rsi;
pub mod sma;

pub use adx::Adx;
pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::Ema;
pub use macd::{Macd, MacdLine};
pub use obv::Obv;
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Candle;

/// Which candle column an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Close,
    Volume,
}

impl Source {
    pub fn extract(self, candles: &[Candle]) -> Vec<f64> {
        match self {
            Source::Close => crate::domain::closes(candles),
            Source::Volume => crate::domain::volumes(candles),
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Source::Close => "",
            Source::Volume => "volume_",
        }
    }
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLCV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    make_candles_with_volume(closes, &vec![1000; closes.len()])
}

/// Like [`make_candles`] with explicit volumes.
#[cfg(test)]
pub fn make_candles_with_volume(closes: &[f64], volumes: &[u64]) -> Vec<Candle> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (&close, &volume))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
