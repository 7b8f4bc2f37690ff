//! SwingScan Core: indicators, scoring strategies, regime filter, backtest.
//!
//! This crate is pure computation over in-memory candles:
//! - Domain types (candles, indicator frames, trades, signals)
//! - Technical indicators with explicit warm-up
//! - Bullish rating, EMA proximity and EMA cascade scanners
//! - Market regime classifier
//! - Long-only swing backtest as an explicit state machine
//! - Candle provider trait; fetching lives in the runner

pub mod components;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod levels;

pub use error::ScanError;
