//! ADX: Average Directional Index (Wilder).
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive candles
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR), -DI likewise
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Warm-up: 2 * period - 1 (one bar for the first DM, period - 1 for DI
//! smoothing, period - 1 for ADX smoothing).

use crate::components::indicator::Indicator;
use crate::domain::Candle;
use crate::indicators::atr::{true_range, wilder_smooth};

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = candles
            .windows(2)
            .map(|w| {
                let up = w[1].high - w[0].high;
                let down = w[0].low - w[1].low;
                let plus = if up > down && up > 0.0 { up } else { 0.0 };
                let minus = if down > up && down > 0.0 { down } else { 0.0 };
                (plus, minus)
            })
            .unzip();

        let tr = wilder_smooth(&true_range(candles), self.period);
        let plus = wilder_smooth(&plus_dm, self.period);
        let minus = wilder_smooth(&minus_dm, self.period);

        let dx: Vec<f64> = tr
            .iter()
            .zip(plus.iter().zip(&minus))
            .map(|(&tr, (&p, &m))| {
                if tr == 0.0 {
                    return 0.0;
                }
                let plus_di = 100.0 * p / tr;
                let minus_di = 100.0 * m / tr;
                let sum = plus_di + minus_di;
                if sum == 0.0 {
                    0.0
                } else {
                    100.0 * (plus_di - minus_di).abs() / sum
                }
            })
            .collect();

        wilder_smooth(&dx, self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;

    #[test]
    fn adx_native_length() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let candles = make_candles(&closes);
        let adx = Adx::new(14);
        assert_eq!(adx.compute(&candles).len(), 40 - 27);
        assert_eq!(adx.warmup(), 27);
    }

    #[test]
    fn adx_strong_trend_is_high() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + 2.0 * i as f64).collect();
        let candles = make_candles(&closes);
        let result = Adx::new(14).compute(&candles);
        let last = *result.last().unwrap();
        assert!(last > 50.0, "steady uptrend should give high ADX, got {last}");
        assert!(last <= 100.0);
    }

    #[test]
    fn adx_flat_market_is_zero() {
        let candles = make_candles(&[50.0; 40]);
        let result = Adx::new(5).compute(&candles);
        assert!(!result.is_empty());
        assert!(result.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn adx_too_short_is_empty() {
        let candles = make_candles(&[1.0, 2.0, 3.0]);
        assert!(Adx::new(14).compute(&candles).is_empty());
    }
}
