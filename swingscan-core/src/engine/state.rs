//! Position state for the long-only backtest.
//!
//! The strategy holds at most one position. Cooldown is a distinct state
//! so a bar can never be both "flat and entering" and "inside cooldown".

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PositionState {
    #[default]
    Flat,
    Long {
        entry_price: f64,
        entry_date: NaiveDate,
        /// Highest close seen since entry, entry close included.
        peak: f64,
    },
    /// No entries on or before `until`.
    Cooldown { until: NaiveDate },
}

impl PositionState {
    pub fn open(entry_price: f64, entry_date: NaiveDate) -> Self {
        PositionState::Long {
            entry_price,
            entry_date,
            peak: entry_price,
        }
    }

    pub fn is_long(&self) -> bool {
        matches!(self, PositionState::Long { .. })
    }

    /// Cooldown expired on `date` collapses to Flat; other states pass through.
    pub fn settle(self, date: NaiveDate) -> Self {
        match self {
            PositionState::Cooldown { until } if date > until => PositionState::Flat,
            other => other,
        }
    }

    /// Whether entries are blocked on `date`.
    pub fn cooling_down(&self, date: NaiveDate) -> bool {
        matches!(self, PositionState::Cooldown { until } if date <= *until)
    }
}

/// A position still open after the last bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub peak: f64,
    pub last_close: f64,
    pub unrealized_pct: f64,
}
