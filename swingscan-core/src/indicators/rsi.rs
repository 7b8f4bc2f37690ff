//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Warm-up: period (the first value needs `period` price changes).
//! Edge cases: no movement → 50; avg_loss == 0 → 100; avg_gain == 0 → 0.

use crate::components::indicator::Indicator;
use crate::domain::{closes, Candle};

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        rsi_series(&closes(candles), self.period)
    }
}

/// Native RSI over closes: `closes.len() - period` outputs.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || closes.len() <= period {
        return Vec::new();
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[..period] {
        if ch > 0.0 {
            avg_gain += ch;
        } else {
            avg_loss -= ch;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let mut result = Vec::with_capacity(changes.len() - period + 1);
    result.push(compute_rsi(avg_gain, avg_loss));

    let alpha = 1.0 / period as f64;
    for &ch in &changes[period..] {
        let gain = ch.max(0.0);
        let loss = (-ch).max(0.0);
        avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        result.push(compute_rsi(avg_gain, avg_loss));
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn rsi_all_gains() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&candles);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|&v| v == 100.0));
    }

    #[test]
    fn rsi_all_losses() {
        let candles = make_candles(&[105.0, 104.0, 103.0, 102.0, 101.0]);
        let result = Rsi::new(3).compute(&candles);
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn rsi_flat_is_fifty() {
        let candles = make_candles(&[50.0; 6]);
        let result = Rsi::new(3).compute(&candles);
        assert!(result.iter().all(|&v| v == 50.0));
    }

    #[test]
    fn rsi_known_values() {
        // changes: +0.5, -0.5, +1.0, +0.5
        // seed(2): gain 0.25, loss 0.25 → 50
        // +1.0: gain 0.625, loss 0.125 → RS 5 → 83.333..
        // +0.5: gain 0.5625, loss 0.0625 → RS 9 → 90
        let candles = make_candles(&[44.0, 44.5, 44.0, 45.0, 45.5]);
        let result = Rsi::new(2).compute(&candles);
        assert_eq!(result.len(), 3);
        assert_approx(result[0], 50.0, 1e-9);
        assert_approx(result[1], 100.0 - 100.0 / 6.0, 1e-9);
        assert_approx(result[2], 90.0, 1e-9);
    }

    #[test]
    fn rsi_bounded() {
        let closes = [10.0, 12.0, 9.0, 14.0, 8.0, 15.0, 7.5, 16.0, 11.0, 13.0];
        for v in rsi_series(&closes, 4) {
            assert!((0.0..=100.0).contains(&v));
        }
    }

    #[test]
    fn rsi_needs_period_plus_one_closes() {
        assert!(rsi_series(&[1.0, 2.0, 3.0], 3).is_empty());
        assert_eq!(rsi_series(&[1.0, 2.0, 3.0, 4.0], 3).len(), 1);
        assert_eq!(Rsi::new(14).warmup(), 14);
    }
}
