//! On-Balance Volume (OBV).
//!
//! Running total starting at zero: add the bar's volume when the close rises,
//! subtract it when the close falls, carry it when unchanged.
//! Warm-up: 1 (the first candle has no previous close).

use crate::components::indicator::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone, Default)]
pub struct Obv;

impl Indicator for Obv {
    fn name(&self) -> &str {
        "obv"
    }

    fn warmup(&self) -> usize {
        1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let mut total = 0.0;
        candles
            .windows(2)
            .map(|w| {
                let volume = w[1].volume as f64;
                if w[1].close > w[0].close {
                    total += volume;
                } else if w[1].close < w[0].close {
                    total -= volume;
                }
                total
            })
            .collect()
    }
}
