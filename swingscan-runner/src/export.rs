//! Artifact export: JSON reports and CSV trade tapes.
//!
//! A signal report lands in `<dir>/<SYMBOL>/` as `report.json` (the full
//! `SignalReport`) and `trades.csv`. Scan summaries are written as one JSON
//! file per scan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use swingscan_core::domain::Trade;

use crate::scan::SignalReport;

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize to JSON")
}

pub fn import_report(json: &str) -> Result<SignalReport> {
    serde_json::from_str(json).context("failed to deserialize SignalReport from JSON")
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Columns: type, date, price, profit_pct, holding_days, reason.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["type", "date", "price", "profit_pct", "holding_days", "reason"])?;

    for t in trades {
        wtr.write_record([
            t.trade_type.to_string(),
            t.date.to_string(),
            format!("{:.2}", t.price),
            t.profit_pct.map(|p| format!("{p:.2}")).unwrap_or_default(),
            t.holding_days.map(|d| d.to_string()).unwrap_or_default(),
            t.reason.clone(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Paths written by [`save_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub dir: PathBuf,
    pub report: PathBuf,
    pub trades: PathBuf,
}

/// Write `report.json` and `trades.csv` under `<output_dir>/<SYMBOL>/`.
pub fn save_report(report: &SignalReport, output_dir: &Path) -> Result<ReportPaths> {
    let dir = output_dir.join(sanitize(&report.symbol));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create artifact dir: {}", dir.display()))?;

    let report_path = dir.join("report.json");
    std::fs::write(&report_path, export_json(report)?)
        .with_context(|| format!("failed to write {}", report_path.display()))?;

    let trades_path = dir.join("trades.csv");
    std::fs::write(&trades_path, export_trades_csv(&report.trades)?)
        .with_context(|| format!("failed to write {}", trades_path.display()))?;

    Ok(ReportPaths {
        dir,
        report: report_path,
        trades: trades_path,
    })
}

pub fn load_report(dir: &Path) -> Result<SignalReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_report(&json)
}

/// Write any scan summary as `<output_dir>/<name>.json`.
pub fn save_scan<T: Serialize>(value: &T, name: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;
    let path = output_dir.join(format!("{}.json", sanitize(name)));
    std::fs::write(&path, export_json(value)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

/// Symbols like `^NSEI` or `M&M` become safe directory names.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
