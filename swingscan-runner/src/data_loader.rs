//! Candle providers for the runner.
//!
//! - `CsvProvider`: a directory of per-interval CSV files
//! - `SyntheticProvider`: deterministic random walks (developer mode)
//! - `MemoryProvider`: in-memory series for tests and embedding
//!
//! Weekly requests fall back to resampling daily data when no weekly series
//! exists. A missing series is "no data" (empty), never an error.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use swingscan_core::data::provider::{normalize, trim_to_lookback};
use swingscan_core::data::{resample_weekly, CandleProvider, DataError, Interval};
use swingscan_core::domain::Candle;

/// Bars per weekday generated for intraday synthetic series.
fn bars_per_day(interval: Interval) -> usize {
    match interval {
        Interval::FifteenMinute => 25,
        Interval::Hourly => 7,
        Interval::Daily | Interval::Weekly => 1,
    }
}

/// Sort and validate. Intraday series keep every bar of a date.
fn clean(candles: Vec<Candle>, symbol: &str, interval: Interval) -> Vec<Candle> {
    if !interval.is_intraday() {
        return normalize(candles, symbol);
    }
    let before = candles.len();
    let mut kept: Vec<Candle> = candles.into_iter().filter(Candle::is_sane).collect();
    if kept.len() < before {
        warn!(symbol, dropped = before - kept.len(), "dropped malformed candles");
    }
    kept.sort_by_key(|c| c.date);
    kept
}

// ── CSV ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Reads `<root>/<interval-label>/<SYMBOL>.csv`.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    root: PathBuf,
}

impl CsvProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.root
            .join(interval.label())
            .join(format!("{}.csv", symbol.to_ascii_uppercase()))
    }

    fn read(&self, path: &Path) -> Result<Vec<(NaiveDateTime, Candle)>, DataError> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(path, e))?;
        let mut out = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| csv_error(path, e))?;
            let stamp = parse_timestamp(&row.date).ok_or_else(|| DataError::Parse {
                context: format!("{} row {}", path.display(), line + 2),
                message: format!("unrecognised date '{}'", row.date),
            })?;
            out.push((
                stamp,
                Candle {
                    date: stamp.date(),
                    open: row.open,
                    high: row.high,
                    low: row.low,
                    close: row.close,
                    volume: row.volume.max(0.0).round() as u64,
                },
            ));
        }
        Ok(out)
    }

    fn load(&self, symbol: &str, interval: Interval) -> Result<Option<Vec<Candle>>, DataError> {
        let path = self.path_for(symbol, interval);
        if !path.exists() {
            return Ok(None);
        }
        let mut rows = self.read(&path)?;
        rows.sort_by_key(|(stamp, _)| *stamp);
        let candles = rows.into_iter().map(|(_, c)| c).collect();
        Ok(Some(clean(candles, symbol, interval)))
    }
}

fn csv_error(path: &Path, e: csv::Error) -> DataError {
    match e.into_kind() {
        csv::ErrorKind::Io(source) => DataError::Io {
            path: path.display().to_string(),
            source,
        },
        kind => DataError::Parse {
            context: path.display().to_string(),
            message: format!("{kind:?}"),
        },
    }
}

/// `YYYY-MM-DD`, optionally followed by a time of day.
fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    let day = s.get(..10)?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<Vec<Candle>, DataError> {
        let candles = match self.load(symbol, interval)? {
            Some(candles) => candles,
            None if interval == Interval::Weekly => match self.load(symbol, Interval::Daily)? {
                Some(daily) => {
                    debug!(symbol, "no weekly file, resampling daily");
                    resample_weekly(&daily)
                }
                None => Vec::new(),
            },
            None => Vec::new(),
        };
        Ok(trim_to_lookback(candles, lookback_days))
    }
}

// ── Synthetic ────────────────────────────────────────────────────────

/// Deterministic random walks ending at `end`, seeded per symbol.
///
/// Results are clearly fake; use only for development and demos.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    end: NaiveDate,
}

impl SyntheticProvider {
    pub fn new(end: NaiveDate) -> Self {
        Self { end }
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl CandleProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<Vec<Candle>, DataError> {
        let start = self.end - chrono::Duration::days(i64::from(lookback_days));
        let bars = generate_synthetic_candles(symbol, start, self.end, bars_per_day(interval));
        Ok(match interval {
            Interval::Weekly => resample_weekly(&bars),
            _ => bars,
        })
    }
}

/// Random walk from 100.0 over weekdays in `(start, end]`.
pub fn generate_synthetic_candles(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    per_day: usize,
) -> Vec<Candle> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let per_day = per_day.max(1);
    let scale = 1.0 / (per_day as f64).sqrt();
    let mut candles = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start + chrono::Duration::days(1);

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        for _ in 0..per_day {
            let ret: f64 = rng.gen_range(-0.03..0.03) * scale;
            let open = price;
            let close = price * (1.0 + ret);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01) * scale);
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01) * scale);
            let volume = rng.gen_range(500_000..5_000_000u64) / per_day as u64;

            candles.push(Candle {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });
            price = close;
        }
        current += chrono::Duration::days(1);
    }

    candles
}

// ── In-memory ────────────────────────────────────────────────────────

/// Provider over series held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    series: HashMap<(String, Interval), Vec<Candle>>,
    failing: HashSet<String>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: &str, interval: Interval, candles: Vec<Candle>) {
        self.series.insert((symbol.to_string(), interval), candles);
    }

    pub fn with(mut self, symbol: &str, interval: Interval, candles: Vec<Candle>) -> Self {
        self.insert(symbol, interval, candles);
        self
    }

    /// Make every fetch of `symbol` fail, to exercise error isolation.
    pub fn failing(mut self, symbol: &str) -> Self {
        self.failing.insert(symbol.to_string());
        self
    }
}

impl CandleProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        lookback_days: u32,
        interval: Interval,
    ) -> Result<Vec<Candle>, DataError> {
        if self.failing.contains(symbol) {
            return Err(DataError::Other(format!("{symbol}: provider unavailable")));
        }
        let key = (symbol.to_string(), interval);
        let candles = match self.series.get(&key) {
            Some(c) => c.clone(),
            None if interval == Interval::Weekly => self
                .series
                .get(&(symbol.to_string(), Interval::Daily))
                .map(|daily| resample_weekly(daily))
                .unwrap_or_default(),
            None => Vec::new(),
        };
        Ok(trim_to_lookback(candles, lookback_days))
    }
}
