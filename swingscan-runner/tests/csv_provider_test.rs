//! CSV provider and artifact round-trips against a temporary directory.

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use swingscan_core::data::{resample_weekly, CandleProvider, Interval};
use swingscan_runner::export::load_report;
use swingscan_runner::{analyze_symbol, save_report, CsvProvider, ScanConfig};

fn write_csv(root: &Path, interval: &str, symbol: &str, body: &str) {
    let dir = root.join(interval);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{symbol}.csv")), body).unwrap();
}

/// `n` weekday rows from 2024-01-01 on a gentle sine walk.
fn daily_csv(n: usize) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut written = 0;
    while written < n {
        use chrono::Datelike;
        if date.weekday().number_from_monday() <= 5 {
            let close = 100.0 + (written as f64 * 0.3).sin() * 5.0 + written as f64 * 0.05;
            let open = close - 0.2;
            out.push_str(&format!(
                "{date},{open:.4},{:.4},{:.4},{close:.4},{}\n",
                close + 1.0,
                open - 1.0,
                10_000 + written * 10
            ));
            written += 1;
        }
        date += chrono::Duration::days(1);
    }
    out
}

#[test]
fn reads_sorts_and_trims_daily_csv() {
    let tmp = tempfile::tempdir().unwrap();
    write_csv(
        tmp.path(),
        "1d",
        "TCS",
        "date,open,high,low,close,volume\n\
         2024-01-05,11,12,10,11.5,300\n\
         2024-01-03,10,11,9,10.5,100\n\
         2024-01-04,10.5,11.5,10,11,200\n\
         2024-01-04,10.5,11.5,10,11.2,250\n\
         2024-01-08,11.5,10,12,11,100\n",
    );
    let provider = CsvProvider::new(tmp.path());

    let candles = provider.fetch_candles("TCS", 365, Interval::Daily).unwrap();
    // the last row has high below low and is dropped; the duplicate date keeps the later row
    assert_eq!(candles.len(), 3);
    assert_eq!(candles[0].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    assert_eq!(candles[1].close, 11.2);
    assert_eq!(candles[1].volume, 250);

    let recent = provider.fetch_candles("TCS", 1, Interval::Daily).unwrap();
    assert_eq!(recent.len(), 1);
}

#[test]
fn lowercase_symbol_maps_to_uppercase_file() {
    let tmp = tempfile::tempdir().unwrap();
    write_csv(tmp.path(), "1d", "INFY", &daily_csv(5));
    let provider = CsvProvider::new(tmp.path());
    assert_eq!(provider.fetch_candles("infy", 30, Interval::Daily).unwrap().len(), 5);
}

#[test]
fn missing_file_is_empty_and_weekly_falls_back_to_daily() {
    let tmp = tempfile::tempdir().unwrap();
    write_csv(tmp.path(), "1d", "SBIN", &daily_csv(40));
    let provider = CsvProvider::new(tmp.path());

    assert!(provider
        .fetch_candles("NOPE", 100, Interval::Daily)
        .unwrap()
        .is_empty());

    let daily = provider.fetch_candles("SBIN", 1_000, Interval::Daily).unwrap();
    let weekly = provider.fetch_candles("SBIN", 1_000, Interval::Weekly).unwrap();
    assert_eq!(weekly, resample_weekly(&daily));
    assert_eq!(weekly.len(), 8);
}

#[test]
fn intraday_rows_keep_every_bar_of_a_day() {
    let tmp = tempfile::tempdir().unwrap();
    write_csv(
        tmp.path(),
        "15m",
        "ITC",
        "date,open,high,low,close,volume\n\
         2024-02-01 09:30:00,10,11,9,10.5,10\n\
         2024-02-01 09:15:00,10,11,9,10,10\n\
         2024-02-01 09:45:00,10.5,11,10,10.8,10\n",
    );
    let provider = CsvProvider::new(tmp.path());
    let bars = provider.fetch_candles("ITC", 30, Interval::FifteenMinute).unwrap();
    let closes: Vec<f64> = bars.iter().map(|c| c.close).collect();
    assert_eq!(closes, vec![10.0, 10.5, 10.8]);
}

#[test]
fn malformed_rows_are_errors() {
    let tmp = tempfile::tempdir().unwrap();
    write_csv(
        tmp.path(),
        "1d",
        "BAD",
        "date,open,high,low,close,volume\nnot-a-date,1,2,0.5,1.5,10\n",
    );
    write_csv(
        tmp.path(),
        "1d",
        "WORSE",
        "date,open,high,low,close,volume\n2024-01-02,one,2,0.5,1.5,10\n",
    );
    let provider = CsvProvider::new(tmp.path());
    assert!(provider.fetch_candles("BAD", 30, Interval::Daily).is_err());
    assert!(provider.fetch_candles("WORSE", 30, Interval::Daily).is_err());
}

#[test]
fn report_artifacts_round_trip() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_csv(data.path(), "1d", "RELIANCE", &daily_csv(220));
    let provider = CsvProvider::new(data.path());

    let report = analyze_symbol(&provider, "RELIANCE", &ScanConfig::default()).unwrap();
    let paths = save_report(&report, out.path()).unwrap();

    assert_eq!(paths.dir, out.path().join("RELIANCE"));
    assert!(paths.report.exists());
    let tape = fs::read_to_string(&paths.trades).unwrap();
    assert_eq!(tape.lines().count(), report.trades.len() + 1);

    let loaded = load_report(&paths.dir).unwrap();
    assert_eq!(loaded.symbol, report.symbol);
    assert_eq!(loaded.trades, report.trades);
    assert_eq!(loaded.signal, report.signal);
    assert_eq!(loaded.date, report.date);
}
