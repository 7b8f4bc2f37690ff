//! Daily-to-weekly resampling.

use crate::domain::Candle;
use chrono::Datelike;

/// Bucket candles by ISO week: first open, max high, min low, last close,
/// summed volume, dated by the week's last candle. Input must be ascending.
pub fn resample_weekly(candles: &[Candle]) -> Vec<Candle> {
    let mut weeks: Vec<Candle> = Vec::new();
    let mut current_week = None;

    for c in candles {
        let week = c.date.iso_week();
        let key = (week.year(), week.week());
        match weeks.last_mut() {
            Some(w) if current_week == Some(key) => {
                w.date = c.date;
                w.high = w.high.max(c.high);
                w.low = w.low.min(c.low);
                w.close = c.close;
                w.volume += c.volume;
            }
            _ => {
                weeks.push(c.clone());
                current_week = Some(key);
            }
        }
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn candle(y: i32, m: u32, d: u32, open: f64, close: f64) -> Candle {
        Candle {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 10,
        }
    }

    #[test]
    fn one_week_collapses_to_one_candle() {
        // 2024-01-01 is a Monday.
        let days: Vec<Candle> = (1..=5)
            .map(|d| candle(2024, 1, d, 100.0 + d as f64, 101.0 + d as f64))
            .collect();
        let weeks = resample_weekly(&days);
        assert_eq!(weeks.len(), 1);
        let w = &weeks[0];
        assert_eq!(w.open, 101.0);
        assert_eq!(w.close, 106.0);
        assert_eq!(w.high, 107.0);
        assert_eq!(w.low, 100.0);
        assert_eq!(w.volume, 50);
        assert_eq!(w.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn week_boundary_splits() {
        let days = vec![
            candle(2024, 1, 5, 10.0, 11.0), // Friday
            candle(2024, 1, 8, 11.0, 12.0), // Monday
        ];
        assert_eq!(resample_weekly(&days).len(), 2);
    }

    #[test]
    fn iso_year_boundary_stays_together() {
        // 2024-12-30 (Mon) and 2025-01-02 (Thu) share ISO week 2025-W01.
        let days = vec![
            candle(2024, 12, 30, 10.0, 11.0),
            candle(2025, 1, 2, 11.0, 12.0),
        ];
        assert_eq!(resample_weekly(&days).len(), 1);
    }
}
