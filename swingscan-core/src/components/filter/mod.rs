//! Market filters evaluated on a benchmark series rather than per instrument.

pub mod regime;

pub use regime::{MarketRegime, RegimeClassifier, RegimeParams, Trend};
