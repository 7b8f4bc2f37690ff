//! Average True Range (ATR).
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|), defined
//! from the second candle onward.
//! ATR uses Wilder smoothing (seed = mean of first `period` TRs, then
//! ATR[t] = (ATR[t-1] * (period-1) + TR[t]) / period).
//! Warm-up: period.

use crate::components::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            name: format!("atr_{period}"),
        }
    }
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        wilder_smooth(&true_range(candles), self.period)
    }
}

/// True Range for candles 1..N (`N - 1` values; the first candle has no
/// previous close).
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let (h, l, pc) = (w[1].high, w[1].low, w[0].close);
            (h - l).max((h - pc).abs()).max((l - pc).abs())
        })
        .collect()
}

/// Wilder smoothing: `values.len() - period + 1` outputs seeded by the mean
/// of the first `period` values.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let p = period as f64;
    let seed = values[..period].iter().sum::<f64>() / p;

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);
    let mut prev = seed;
    for &v in &values[period..] {
        prev = (prev * (p - 1.0) + v) / p;
        result.push(prev);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn atr_constant_range() {
        // Flat closes: high = 11, low = 9 → TR = 2 everywhere.
        let candles = make_candles(&[10.0, 10.0, 10.0, 10.0]);
        let result = Atr::new(2).compute(&candles);
        assert_eq!(result.len(), 2);
        for v in result {
            assert_approx(v, 2.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn true_range_uses_previous_close() {
        // bar1: open 10, close 20 → high 21, low 9, prev close 10 → TR 12
        let candles = make_candles(&[10.0, 20.0]);
        let tr = true_range(&candles);
        assert_eq!(tr.len(), 1);
        assert_approx(tr[0], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wilder_smooth_known_values() {
        // seed mean(2,4) = 3; next (3*1 + 6)/2 = 4.5
        let result = wilder_smooth(&[2.0, 4.0, 6.0], 2);
        assert_eq!(result, vec![3.0, 4.5]);
    }

    #[test]
    fn atr_warmup_matches_native_length() {
        let candles = make_candles(&[10.0; 20]);
        let atr = Atr::new(14);
        assert_eq!(atr.compute(&candles).len(), 20 - atr.warmup());
    }
}
