//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(period+1).
//! Seed: the first value is the SMA of the first `period` inputs.
//! Warm-up: period - 1.

use super::Source;
use crate::components::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    source: Source,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self::with_source(period, Source::Close)
    }

    /// EMA of traded volume.
    pub fn of_volume(period: usize) -> Self {
        Self::with_source(period, Source::Volume)
    }

    fn with_source(period: usize, source: Source) -> Self {
        assert!(period >= 1, "EMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("{}ema_{period}", source.prefix()),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        ema_series(&self.source.extract(candles), self.period)
    }
}

/// Native EMA over a plain series: `values.len() - period + 1` outputs,
/// empty when there are fewer than `period` inputs.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);
    let mut prev = seed;
    for &v in &values[period..] {
        prev = alpha * v + (1.0 - alpha) * prev;
        result.push(prev);
    }
    result
}

/// Last EMA value of a series, if it has warmed up.
pub fn last_ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, make_candles_with_volume, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let candles = make_candles(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&candles);
        assert_eq!(result, vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5; seed SMA(10,11,12) = 11; then 12, 13
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&candles);
        assert_eq!(result.len(), 3);
        assert_approx(result[0], 11.0, DEFAULT_EPSILON);
        assert_approx(result[1], 12.0, DEFAULT_EPSILON);
        assert_approx(result[2], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_aligned_has_leading_none() {
        let candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let aligned = Ema::new(3).compute_aligned(&candles);
        assert_eq!(aligned[..2], [None, None]);
        assert_eq!(aligned[2], Some(11.0));
    }

    #[test]
    fn ema_short_series_is_empty() {
        let candles = make_candles(&[10.0, 11.0]);
        assert!(Ema::new(3).compute(&candles).is_empty());
        assert!(last_ema(&[1.0], 3).is_none());
    }

    #[test]
    fn ema_nan_propagates_to_none_after_alignment() {
        let mut candles = make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        candles[3].close = f64::NAN;
        let aligned = Ema::new(3).compute_aligned(&candles);
        assert_eq!(aligned[2], Some(11.0));
        assert!(aligned[3].is_none());
        assert!(aligned[4].is_none());
    }

    #[test]
    fn ema_of_volume_reads_volume_column() {
        let candles = make_candles_with_volume(&[1.0, 1.0, 1.0], &[100, 200, 300]);
        let ema = Ema::of_volume(3);
        assert_eq!(ema.name(), "volume_ema_3");
        assert_approx(ema.compute(&candles)[0], 200.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_warmup() {
        assert_eq!(Ema::new(20).warmup(), 19);
        assert_eq!(Ema::new(1).warmup(), 0);
    }
}
