//! Domain types for SwingScan

pub mod candle;
pub mod frame;
pub mod trade;

pub use candle::{closes, volumes, Candle};
pub use frame::IndicatorFrame;
pub use trade::{round2, SignalAction, TodaySignal, Trade, TradeType};
