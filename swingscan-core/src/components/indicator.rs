//! Indicator trait and suffix alignment.
//!
//! Indicators are pure functions: candle history in, native numeric series
//! out. A native series has `L = N - warmup()` values for `N` candles, and
//! value `k` belongs to candle `warmup() + k`. [`align`] maps a native
//! series back onto the candle index so every indicator lines up with the
//! bar it was computed on, regardless of warm-up length.

use crate::domain::Candle;

/// Trait for indicators.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "ema_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of leading candles with no defined value.
    fn warmup(&self) -> usize;

    /// Compute the native series: `candles.len().saturating_sub(warmup())` values.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;

    /// Compute and right-align to the candle series.
    fn compute_aligned(&self, candles: &[Candle]) -> Vec<Option<f64>> {
        align(&self.compute(candles), candles.len())
    }
}

/// Right-align a native series of `L` values onto `len` candles.
///
/// The first `len - L` entries are `None`; entry `len - L + k` is native
/// value `k`. Non-finite values (a NaN that leaked in from the input) are
/// mapped to `None` rather than surfacing as numbers.
pub fn align(native: &[f64], len: usize) -> Vec<Option<f64>> {
    let native = if native.len() > len {
        &native[native.len() - len..]
    } else {
        native
    };
    let offset = len - native.len();
    let mut out = vec![None; offset];
    out.extend(native.iter().map(|v| v.is_finite().then_some(*v)));
    out
}
