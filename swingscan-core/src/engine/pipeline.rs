//! Indicator pipeline.
//!
//! Every configured indicator is computed once over the whole candle series,
//! right-aligned, and folded into one [`IndicatorFrame`] per candle.

use crate::components::indicator::Indicator;
use crate::domain::{Candle, IndicatorFrame};
use crate::indicators::{Adx, Atr, Bollinger, Ema, Macd, MacdLine, Obv, Rsi, Sma};
use serde::{Deserialize, Serialize};

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const ATR_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;
pub const VOLUME_PERIOD: usize = 20;

/// Tunable pipeline parameters. MACD, ATR, ADX, Bollinger and the volume
/// averages use the fixed constants above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// EMA periods published on every frame in addition to fast/slow.
    pub ema_periods: Vec<usize>,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_fast: 9,
            ema_slow: 21,
            ema_periods: vec![9, 10, 15, 20, 21, 36, 50],
        }
    }
}

impl IndicatorParams {
    /// Configured EMA periods plus fast/slow, sorted and deduplicated.
    pub fn all_ema_periods(&self) -> Vec<usize> {
        let mut periods = self.ema_periods.clone();
        periods.push(self.ema_fast);
        periods.push(self.ema_slow);
        periods.sort_unstable();
        periods.dedup();
        periods
    }
}

/// Frame field an indicator writes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Rsi,
    EmaFast,
    EmaSlow,
    Ema(usize),
    Macd,
    MacdSignal,
    MacdHistogram,
    Atr,
    Adx,
    BbUpper,
    BbMiddle,
    BbLower,
    Obv,
    VolumeEma,
    AvgVolume,
}

impl Slot {
    fn assign(self, frame: &mut IndicatorFrame, value: Option<f64>) {
        match self {
            Slot::Rsi => frame.rsi = value,
            Slot::EmaFast => frame.ema_fast = value,
            Slot::EmaSlow => frame.ema_slow = value,
            Slot::Ema(period) => {
                if let Some(v) = value {
                    frame.emas.insert(period, v);
                }
            }
            Slot::Macd => frame.macd = value,
            Slot::MacdSignal => frame.macd_signal = value,
            Slot::MacdHistogram => frame.macd_histogram = value,
            Slot::Atr => frame.atr = value,
            Slot::Adx => frame.adx = value,
            Slot::BbUpper => frame.bb_upper = value,
            Slot::BbMiddle => frame.bb_middle = value,
            Slot::BbLower => frame.bb_lower = value,
            Slot::Obv => frame.obv = value,
            Slot::VolumeEma => frame.volume_ema = value,
            Slot::AvgVolume => frame.avg_volume = value,
        }
    }
}

fn indicator_set(params: &IndicatorParams) -> Vec<(Slot, Box<dyn Indicator>)> {
    let mut set: Vec<(Slot, Box<dyn Indicator>)> = vec![
        (Slot::Rsi, Box::new(Rsi::new(params.rsi_period))),
        (Slot::EmaFast, Box::new(Ema::new(params.ema_fast))),
        (Slot::EmaSlow, Box::new(Ema::new(params.ema_slow))),
        (
            Slot::Macd,
            Box::new(Macd::new(MacdLine::Macd, MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        ),
        (
            Slot::MacdSignal,
            Box::new(Macd::new(MacdLine::Signal, MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        ),
        (
            Slot::MacdHistogram,
            Box::new(Macd::new(MacdLine::Histogram, MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
        ),
        (Slot::Atr, Box::new(Atr::new(ATR_PERIOD))),
        (Slot::Adx, Box::new(Adx::new(ADX_PERIOD))),
        (
            Slot::BbUpper,
            Box::new(Bollinger::upper(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
        ),
        (
            Slot::BbMiddle,
            Box::new(Bollinger::middle(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
        ),
        (
            Slot::BbLower,
            Box::new(Bollinger::lower(BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
        ),
        (Slot::Obv, Box::new(Obv)),
        (Slot::VolumeEma, Box::new(Ema::of_volume(VOLUME_PERIOD))),
        (Slot::AvgVolume, Box::new(Sma::of_volume(VOLUME_PERIOD))),
    ];
    for period in params.all_ema_periods() {
        set.push((Slot::Ema(period), Box::new(Ema::new(period))));
    }
    set
}

/// Run the pipeline: one frame per candle, same length and order.
///
/// A series shorter than an indicator's warm-up leaves that field `None`
/// on every frame.
pub fn compute_frames(candles: &[Candle], params: &IndicatorParams) -> Vec<IndicatorFrame> {
    let columns: Vec<(Slot, Vec<Option<f64>>)> = indicator_set(params)
        .iter()
        .map(|(slot, indicator)| {
            let column = indicator.compute_aligned(candles);
            debug_assert_eq!(
                column.len(),
                candles.len(),
                "indicator '{}' misaligned",
                indicator.name()
            );
            (*slot, column)
        })
        .collect();

    candles
        .iter()
        .enumerate()
        .map(|(i, candle)| {
            let mut frame = IndicatorFrame::bare(candle.clone());
            for (slot, column) in &columns {
                slot.assign(&mut frame, column[i]);
            }
            frame
        })
        .collect()
}
