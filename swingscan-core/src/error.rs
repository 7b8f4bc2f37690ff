//! Error kinds shared by the scoring strategies and the regime classifier.
//!
//! None of these abort a batch: callers degrade a failed instrument to a
//! neutral result (bullish rating), an absent result (detectors) or a
//! fail-open default (regime).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("insufficient history for {symbol}: need {needed} bars, have {available}")]
    DataUnavailable {
        symbol: String,
        needed: usize,
        available: usize,
    },

    #[error("indicator '{indicator}' undefined at bar {index}")]
    IndicatorUndefined { indicator: String, index: usize },

    #[error("degenerate computation: {0}")]
    ComputationDegenerate(String),

    #[error("external dependency failed: {0}")]
    ExternalDependency(String),
}

impl ScanError {
    pub fn undefined(indicator: impl Into<String>, index: usize) -> Self {
        ScanError::IndicatorUndefined {
            indicator: indicator.into(),
            index,
        }
    }
}

/// Unwrap an optional indicator value or report which one was missing.
pub fn require(value: Option<f64>, indicator: &str, index: usize) -> Result<f64, ScanError> {
    value.ok_or_else(|| ScanError::undefined(indicator, index))
}
