//! EMA-proximity breakout detector.
//!
//! Flags instruments whose last close sits strictly below a long-horizon EMA
//! but within a narrow band of it. Intended for coarse bars (weekly).

use crate::domain::{closes, Candle};
use crate::error::ScanError;
use crate::indicators::ema::last_ema;
use serde::{Deserialize, Serialize};

use super::Scanner;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityParams {
    pub ema_period: usize,
    /// Band width below the EMA, in percent.
    pub threshold_pct: f64,
    pub min_bars: usize,
}

impl Default for ProximityParams {
    fn default() -> Self {
        Self {
            ema_period: 36,
            threshold_pct: 2.0,
            min_bars: 50,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakoutStatus {
    ApproachingBreakout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutResult {
    pub symbol: String,
    pub last_price: f64,
    pub long_ema: f64,
    pub percent_diff: f64,
    pub status: BreakoutStatus,
}

/// Percent distance of `close` from `ema`; 0 when the EMA is non-positive.
pub fn percent_diff(close: f64, ema: f64) -> f64 {
    if ema <= 0.0 {
        return 0.0;
    }
    (close - ema) / ema * 100.0
}

/// Strictly below the EMA but inside the band.
pub fn is_approaching(percent_diff: f64, threshold_pct: f64) -> bool {
    percent_diff < 0.0 && percent_diff > -threshold_pct
}

#[derive(Debug, Clone)]
pub struct EmaProximity {
    params: ProximityParams,
}

impl EmaProximity {
    pub fn new(params: ProximityParams) -> Self {
        assert!(params.ema_period >= 1, "EMA period must be >= 1");
        Self { params }
    }

    pub fn default_params() -> Self {
        Self::new(ProximityParams::default())
    }
}

impl Scanner for EmaProximity {
    type Output = BreakoutResult;

    fn name(&self) -> &str {
        "ema_proximity"
    }

    fn min_bars(&self) -> usize {
        self.params.min_bars
    }

    fn scan(&self, symbol: &str, candles: &[Candle]) -> Result<Option<BreakoutResult>, ScanError> {
        if candles.len() < self.min_bars() {
            return Ok(None);
        }
        let closes = closes(candles);
        let Some(ema) = last_ema(&closes, self.params.ema_period) else {
            return Ok(None);
        };
        let last_price = closes[closes.len() - 1];
        let diff = percent_diff(last_price, ema);

        if !is_approaching(diff, self.params.threshold_pct) {
            return Ok(None);
        }
        Ok(Some(BreakoutResult {
            symbol: symbol.to_string(),
            last_price,
            long_ema: ema,
            percent_diff: diff,
            status: BreakoutStatus::ApproachingBreakout,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    fn series_ending_at(level: f64, last: f64) -> Vec<Candle> {
        let mut closes = vec![level; 59];
        closes.push(last);
        make_candles(&closes)
    }

    #[test]
    fn just_below_ema_is_flagged() {
        // EMA of a flat 100 series with a final 99.5: EMA ≈ 99.97, diff ≈ -0.47%
        let result = EmaProximity::default_params()
            .scan("NEAR", &series_ending_at(100.0, 99.5))
            .unwrap()
            .unwrap();
        assert_eq!(result.status, BreakoutStatus::ApproachingBreakout);
        assert!(result.percent_diff < 0.0 && result.percent_diff > -2.0);
        assert_eq!(result.last_price, 99.5);
    }

    #[test]
    fn above_ema_is_not_flagged() {
        let result = EmaProximity::default_params()
            .scan("ABOVE", &series_ending_at(100.0, 101.0))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn far_below_ema_is_not_flagged() {
        let result = EmaProximity::default_params()
            .scan("FAR", &series_ending_at(100.0, 90.0))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn short_history_skips_silently() {
        let candles = make_candles(&[100.0; 49]);
        assert_eq!(EmaProximity::default_params().scan("NEW", &candles), Ok(None));
    }

    #[test]
    fn band_is_open_on_both_ends() {
        assert!(!is_approaching(0.0, 2.0));
        assert!(!is_approaching(-2.0, 2.0));
        assert!(is_approaching(-1.999, 2.0));
        assert_eq!(percent_diff(10.0, 0.0), 0.0);
    }
}
