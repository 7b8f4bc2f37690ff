//! Backtest engine: indicator pipeline, position state machine, summary.
//!
//! The pipeline turns candles into indicator frames once per instrument.
//! The backtest folds over those frames bar by bar and never looks ahead.

pub mod backtest;
pub mod pipeline;
pub mod rules;
pub mod state;
pub mod summary;

pub use backtest::{run_backtest, step, today_signal, BacktestOutcome, BacktestParams};
pub use pipeline::{compute_frames, IndicatorParams};
pub use rules::{entry_signal, exit_signal, BarInputs, Confirmation, ExitReason};
pub use state::{OpenPosition, PositionState};
pub use summary::{cagr, summarize, win_rate, BacktestSummary};
