//! Universe scans and the single-instrument signal report.
//!
//! Scans fetch each instrument independently through the paced batch
//! utility. A provider failure or an empty series affects only that
//! instrument: it is counted, logged and left out (or neutral).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use swingscan_core::components::filter::{MarketRegime, RegimeClassifier};
use swingscan_core::components::signal::{
    BreakoutResult, BullishRating, CrossoverResult, EmaCascade, EmaProximity, Scanner, ScoreResult,
};
use swingscan_core::data::{CandleProvider, DataError, Interval};
use swingscan_core::domain::{round2, TodaySignal, Trade};
use swingscan_core::engine::{compute_frames, run_backtest, BacktestSummary, OpenPosition};
use swingscan_core::error::ScanError;
use swingscan_core::fingerprint::dataset_hash;

use crate::batch::{run_paced, Pacing};
use crate::config::{ConfigError, ScanConfig};

#[derive(Debug, Error)]
pub enum ScanRunError {
    #[error("no candles available for {symbol}")]
    NoData { symbol: String },

    #[error("data error: {0}")]
    Data(#[from] DataError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Results of one universe scan plus per-instrument bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary<T> {
    pub results: Vec<T>,
    /// Instruments requested.
    pub scanned: usize,
    /// Instruments with no candles.
    pub skipped: usize,
    /// Instruments whose fetch failed.
    pub failed: usize,
}

enum Outcome<T> {
    Scored(Option<T>),
    Skipped,
    Failed(Option<T>),
}

/// Fetch and scan every symbol; outputs keep input order.
pub fn scan_universe<S: Scanner>(
    provider: &dyn CandleProvider,
    symbols: &[String],
    scanner: &S,
    lookback_days: u32,
    interval: Interval,
    pacing: Pacing,
) -> ScanSummary<S::Output> {
    let outcomes = run_paced(symbols, pacing, |symbol| {
        match provider.fetch_candles(symbol, lookback_days, interval) {
            Ok(candles) if candles.is_empty() => {
                debug!(scanner = scanner.name(), symbol = %symbol, "no candles, skipping");
                Outcome::Skipped
            }
            Ok(candles) => Outcome::Scored(scanner.scan_or_default(symbol, &candles)),
            Err(e) => {
                warn!(scanner = scanner.name(), symbol = %symbol, error = %e, "fetch failed");
                let err = ScanError::ExternalDependency(e.to_string());
                Outcome::Failed(scanner.on_failure(symbol, &err))
            }
        }
    });

    let mut summary = ScanSummary {
        results: Vec::new(),
        scanned: symbols.len(),
        skipped: 0,
        failed: 0,
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Scored(result) => summary.results.extend(result),
            Outcome::Skipped => summary.skipped += 1,
            Outcome::Failed(result) => {
                summary.failed += 1;
                summary.results.extend(result);
            }
        }
    }
    summary
}

/// Classify the configured benchmark, failing open on any error.
pub fn market_regime(provider: &dyn CandleProvider, config: &ScanConfig) -> MarketRegime {
    let params = &config.regime;
    let classifier = RegimeClassifier::new(params.clone());
    match provider.fetch_candles(&params.benchmark, params.lookback_days, Interval::Daily) {
        Ok(candles) => classifier.classify_or_fail_open(&candles),
        Err(e) => {
            warn!(benchmark = %params.benchmark, error = %e, "benchmark fetch failed, regime fails open");
            MarketRegime::fail_open()
        }
    }
}

/// Bullish rating over the universe: ranked by rating, bullish only, top N.
pub fn scan_bullish(
    provider: &dyn CandleProvider,
    symbols: &[String],
    config: &ScanConfig,
) -> ScanSummary<ScoreResult> {
    let regime = market_regime(provider, config);
    let scanner = BullishRating::new(
        config.bullish.params.clone(),
        config.levels.clone(),
        config.indicators.rsi_period,
    );
    let mut summary = scan_universe(
        provider,
        symbols,
        &scanner,
        config.bullish.lookback_days,
        Interval::Daily,
        Pacing::from(&config.batch),
    );

    for result in &mut summary.results {
        result.market_regime_bullish = Some(regime.is_bullish);
    }
    summary.results.sort_by(|a, b| b.rating.cmp(&a.rating));
    summary.results.retain(|r| r.is_bullish);
    summary.results.truncate(config.bullish.top_n);

    info!(
        scanned = summary.scanned,
        bullish = summary.results.len(),
        skipped = summary.skipped,
        failed = summary.failed,
        regime_bullish = regime.is_bullish,
        "bullish scan complete"
    );
    summary
}

/// Weekly EMA-proximity breakouts.
pub fn scan_breakouts(
    provider: &dyn CandleProvider,
    symbols: &[String],
    config: &ScanConfig,
) -> ScanSummary<BreakoutResult> {
    let scanner = EmaProximity::new(config.proximity.params.clone());
    let summary = scan_universe(
        provider,
        symbols,
        &scanner,
        config.proximity.lookback_days,
        Interval::Weekly,
        Pacing::from(&config.batch),
    );
    info!(
        scanned = summary.scanned,
        approaching = summary.results.len(),
        skipped = summary.skipped,
        failed = summary.failed,
        "breakout scan complete"
    );
    summary
}

/// EMA cascade crossovers on the configured interval.
pub fn scan_crossovers(
    provider: &dyn CandleProvider,
    symbols: &[String],
    config: &ScanConfig,
) -> ScanSummary<CrossoverResult> {
    let section = &config.cascade;
    let scanner = EmaCascade::new(section.params.clone(), section.interval);
    let summary = scan_universe(
        provider,
        symbols,
        &scanner,
        section.lookback_days(),
        section.interval,
        Pacing::from(&config.batch),
    );
    info!(
        scanned = summary.scanned,
        crossovers = summary.results.len(),
        skipped = summary.skipped,
        failed = summary.failed,
        interval = %section.interval,
        "crossover scan complete"
    );
    summary
}

// ── Signal report ────────────────────────────────────────────────────

/// Most recent trade and how far price has moved since.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviousTrade {
    pub trade: Trade,
    pub change_since_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub symbol: String,
    /// Config hash prefix joined with dataset hash prefix.
    pub run_id: String,
    pub date: NaiveDate,
    pub bars: usize,
    pub price: f64,
    pub rsi: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub signal: TodaySignal,
    pub previous_trade: Option<PreviousTrade>,
    pub open_position: Option<OpenPosition>,
    pub trades: Vec<Trade>,
    pub summary: Option<BacktestSummary>,
}

/// Backtest one instrument over daily candles and report today's signal.
pub fn analyze_symbol(
    provider: &dyn CandleProvider,
    symbol: &str,
    config: &ScanConfig,
) -> Result<SignalReport, ScanRunError> {
    let candles = provider.fetch_candles(symbol, config.backtest.lookback_days, Interval::Daily)?;
    let frames = compute_frames(&candles, &config.indicators);
    let Some(last) = frames.last() else {
        return Err(ScanRunError::NoData {
            symbol: symbol.to_string(),
        });
    };

    let outcome = run_backtest(&frames, &config.backtest.params);
    let price = last.close();
    let previous_trade = outcome.trades.last().map(|t| PreviousTrade {
        change_since_pct: if t.price > 0.0 {
            round2((price - t.price) / t.price * 100.0)
        } else {
            0.0
        },
        trade: t.clone(),
    });

    let run_id = format!(
        "{}-{}",
        config.config_hash()?.short(),
        dataset_hash(&candles).short()
    );
    info!(
        symbol,
        run_id = %run_id,
        action = %outcome.signal.action,
        trades = outcome.trades.len(),
        "signal report ready"
    );

    Ok(SignalReport {
        symbol: symbol.to_string(),
        run_id,
        date: last.candle.date,
        bars: frames.len(),
        price,
        rsi: last.rsi,
        ema_fast: last.ema_fast,
        ema_slow: last.ema_slow,
        signal: outcome.signal,
        previous_trade,
        open_position: outcome.open_position,
        trades: outcome.trades,
        summary: outcome.summary,
    })
}
