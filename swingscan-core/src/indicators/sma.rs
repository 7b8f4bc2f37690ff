//! Simple Moving Average (SMA).
//!
//! Rolling mean over the trailing `period` inputs.
//! Warm-up: period - 1.

use super::Source;
use crate::components::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    source: Source,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self::with_source(period, Source::Close)
    }

    /// Rolling average volume.
    pub fn of_volume(period: usize) -> Self {
        Self::with_source(period, Source::Volume)
    }

    fn with_source(period: usize, source: Source) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("{}sma_{period}", source.prefix()),
        }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        sma_series(&self.source.extract(candles), self.period)
    }
}

/// Native rolling mean: `values.len() - period + 1` outputs.
pub fn sma_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    values
        .windows(period)
        .map(|w| w.iter().sum::<f64>() / period as f64)
        .collect()
}
