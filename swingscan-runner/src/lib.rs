//! SwingScan Runner: configuration, providers, paced scans, artifacts.
//!
//! This crate builds on `swingscan-core` to provide:
//! - TOML scan configuration with defaults and validation
//! - Candle providers (CSV directory, synthetic, in-memory)
//! - Paced, bounded-concurrency batch execution
//! - Universe scans for each strategy and the single-instrument signal report
//! - JSON/CSV artifact export

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod scan;

pub use batch::{run_paced, Pacing};
pub use config::{ConfigError, ScanConfig};
pub use data_loader::{CsvProvider, MemoryProvider, SyntheticProvider};
pub use export::{save_report, save_scan, ReportPaths};
pub use scan::{
    analyze_symbol, market_regime, scan_breakouts, scan_bullish, scan_crossovers, scan_universe,
    ScanRunError, ScanSummary, SignalReport,
};
