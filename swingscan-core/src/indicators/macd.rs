//! MACD: Moving Average Convergence/Divergence.
//!
//! MACD line = EMA(fast) - EMA(slow), defined once the slow EMA is.
//! Signal    = EMA(signal) of the MACD line.
//! Histogram = MACD - Signal.
//!
//! Warm-up: slow - 1 for the MACD line, slow + signal - 2 for the signal
//! line and histogram.

use crate::components::indicator::Indicator;
use crate::domain::{closes, Candle};
use crate::indicators::ema::ema_series;

/// Which MACD output line an instance produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(line: MacdLine, fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be below slow period");
        let label = match line {
            MacdLine::Macd => "macd",
            MacdLine::Signal => "macd_signal",
            MacdLine::Histogram => "macd_hist",
        };
        Self {
            fast,
            slow,
            signal,
            line,
            name: format!("{label}_{fast}_{slow}_{signal}"),
        }
    }

    /// The conventional 12/26/9 configuration.
    pub fn standard(line: MacdLine) -> Self {
        Self::new(line, 12, 26, 9)
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        match self.line {
            MacdLine::Macd => self.slow - 1,
            MacdLine::Signal | MacdLine::Histogram => self.slow + self.signal - 2,
        }
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let series = macd_series(&closes(candles), self.fast, self.slow, self.signal);
        match self.line {
            MacdLine::Macd => series.macd,
            MacdLine::Signal => series.signal,
            MacdLine::Histogram => series.histogram,
        }
    }
}

/// Native MACD outputs. `signal` and `histogram` have the same length;
/// `macd` is `signal_period - 1` values longer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_series(values: &[f64], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = ema_series(values, fast);
    let slow_ema = ema_series(values, slow);
    if slow_ema.is_empty() || fast >= slow {
        return MacdSeries::default();
    }

    // fast_ema is (slow - fast) values longer; align both to the slow EMA.
    let skip = slow - fast;
    let macd: Vec<f64> = fast_ema[skip..]
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();

    let signal_line = ema_series(&macd, signal);
    let lag = macd.len() - signal_line.len();
    let histogram = macd[lag..]
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    MacdSeries {
        macd,
        signal: signal_line,
        histogram,
    }
}
