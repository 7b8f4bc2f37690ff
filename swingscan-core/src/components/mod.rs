//! Strategy components.
//!
//! - Indicator: one numeric series computed from candles
//! - Scanner: per-instrument scoring or detection
//! - Regime filter: market-wide bullish/bearish gate

pub mod filter;
pub mod indicator;
pub mod signal;

pub use filter::{MarketRegime, RegimeClassifier, RegimeParams, Trend};
pub use indicator::{align, Indicator};
pub use signal::{
    BreakoutResult, BullishRating, CrossoverResult, EmaCascade, EmaProximity, Scanner, ScoreResult,
};
