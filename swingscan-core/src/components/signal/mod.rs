//! Scoring strategies: cross-sectional scanners run once per instrument.
//!
//! Scanners are instrument-agnostic: they receive one candle series and
//! return a structured record, never touching other instruments or shared
//! state. That keeps a universe scan embarrassingly parallel.

pub mod bullish;
pub mod cascade;
pub mod proximity;

pub use bullish::{BullishParams, BullishRating, BullishRule, RatingInputs, RatingWeights, ScoreResult};
pub use cascade::{CascadeParams, CrossoverResult, CrossoverType, EmaCascade};
pub use proximity::{BreakoutResult, BreakoutStatus, EmaProximity, ProximityParams};

use crate::domain::Candle;
use crate::error::ScanError;

/// Trait for per-instrument scanners.
///
/// `scan` returns `Ok(None)` when the instrument simply has no result (too
/// little history, conditions not met). `Err` is reserved for failures; the
/// batch layer turns those into [`Scanner::on_failure`] so one instrument
/// can never abort the rest.
pub trait Scanner: Send + Sync {
    type Output: Send;

    /// Human-readable name (e.g., "bullish_rating").
    fn name(&self) -> &str;

    /// Candles needed before the scanner produces anything.
    fn min_bars(&self) -> usize;

    fn scan(&self, symbol: &str, candles: &[Candle]) -> Result<Option<Self::Output>, ScanError>;

    /// Result substituted for a failed instrument. Absent by default.
    fn on_failure(&self, _symbol: &str, _error: &ScanError) -> Option<Self::Output> {
        None
    }

    /// `scan` with failures folded through `on_failure`.
    fn scan_or_default(&self, symbol: &str, candles: &[Candle]) -> Option<Self::Output> {
        match self.scan(symbol, candles) {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(scanner = self.name(), symbol, error = %e, "scan failed");
                self.on_failure(symbol, &e)
            }
        }
    }
}
