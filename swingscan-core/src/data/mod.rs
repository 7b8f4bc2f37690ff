//! Data access: provider trait, intervals, universes and resampling.
//!
//! Nothing here performs I/O except universe file loading; concrete
//! providers live in the runner.

pub mod provider;
pub mod resample;
pub mod universe;

pub use provider::{CandleProvider, DataError, Interval};
pub use resample::resample_weekly;
pub use universe::Universe;
