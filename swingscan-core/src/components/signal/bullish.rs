//! Multi-factor bullish rating.
//!
//! A short pre-filter (close rising, above EMA10 or EMA20, above the close
//! two bars back) gates a weighted sum of independent predicates. Ratings
//! at or above the threshold are flagged bullish. Stop-loss and target
//! levels are reported whether or not the instrument qualifies.

use crate::domain::{Candle, IndicatorFrame};
use crate::engine::pipeline::{compute_frames, IndicatorParams};
use crate::error::{require, ScanError};
use crate::levels::{compute_levels, swing_range, LevelParams, Levels, SwingRange};
use serde::{Deserialize, Serialize};

use super::Scanner;

/// Points awarded per predicate. Unsigned, so the rating can only grow as
/// more predicates hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingWeights {
    pub above_ema20: u32,
    pub above_ema50: u32,
    pub ema20_above_ema50: u32,
    pub fresh_cross: u32,
    pub rsi_macd: u32,
    pub volume_surge: u32,
    pub obv_rising: u32,
}

impl Default for RatingWeights {
    fn default() -> Self {
        Self {
            above_ema20: 2,
            above_ema50: 1,
            ema20_above_ema50: 2,
            fresh_cross: 2,
            rsi_macd: 1,
            volume_surge: 1,
            obv_rising: 1,
        }
    }
}

impl RatingWeights {
    pub fn weight(&self, rule: BullishRule) -> u32 {
        match rule {
            BullishRule::AboveEma20 => self.above_ema20,
            BullishRule::AboveEma50 => self.above_ema50,
            BullishRule::Ema20AboveEma50 => self.ema20_above_ema50,
            BullishRule::FreshEma20Cross => self.fresh_cross,
            BullishRule::RsiInRangeMacdPositive => self.rsi_macd,
            BullishRule::VolumeAboveAverage => self.volume_surge,
            BullishRule::ObvRising => self.obv_rising,
        }
    }

    /// Highest achievable rating.
    pub fn max_rating(&self) -> u32 {
        BullishRule::ALL.iter().map(|r| self.weight(*r)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BullishParams {
    pub min_bars: usize,
    pub rsi_min: f64,
    pub rsi_max: f64,
    /// Rating at or above which an instrument is bullish.
    pub threshold: u32,
    pub weights: RatingWeights,
}

impl Default for BullishParams {
    fn default() -> Self {
        Self {
            min_bars: 100,
            rsi_min: 40.0,
            rsi_max: 60.0,
            threshold: 5,
            weights: RatingWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BullishRule {
    AboveEma20,
    AboveEma50,
    Ema20AboveEma50,
    FreshEma20Cross,
    RsiInRangeMacdPositive,
    VolumeAboveAverage,
    ObvRising,
}

impl BullishRule {
    pub const ALL: [BullishRule; 7] = [
        BullishRule::AboveEma20,
        BullishRule::AboveEma50,
        BullishRule::Ema20AboveEma50,
        BullishRule::FreshEma20Cross,
        BullishRule::RsiInRangeMacdPositive,
        BullishRule::VolumeAboveAverage,
        BullishRule::ObvRising,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BullishRule::AboveEma20 => "Price above EMA20",
            BullishRule::AboveEma50 => "Price above EMA50",
            BullishRule::Ema20AboveEma50 => "EMA20 > EMA50",
            BullishRule::FreshEma20Cross => "EMA20 cross above EMA50",
            BullishRule::RsiInRangeMacdPositive => "RSI in range and MACD positive",
            BullishRule::VolumeAboveAverage => "Volume above 20-day average",
            BullishRule::ObvRising => "OBV rising",
        }
    }
}

/// Everything the rating looks at, taken from the last three frames.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingInputs {
    pub close: f64,
    pub prev_close: f64,
    /// Close two bars back, when the series has one.
    pub prev_prev_close: Option<f64>,
    pub ema10: f64,
    pub ema20: f64,
    pub ema50: f64,
    pub prev_ema20: f64,
    pub prev_ema50: f64,
    pub rsi: f64,
    pub macd_histogram: f64,
    pub volume: f64,
    pub avg_volume: f64,
    pub obv: f64,
    pub prev_obv: f64,
}

impl RatingInputs {
    /// Gather inputs at the last frame. Any undefined indicator is an error.
    pub fn from_frames(frames: &[IndicatorFrame]) -> Result<Self, ScanError> {
        let n = frames.len();
        if n < 2 {
            return Err(ScanError::ComputationDegenerate(format!(
                "rating needs two frames, got {n}"
            )));
        }
        let (last, prev) = (&frames[n - 1], &frames[n - 2]);
        let (i, p) = (n - 1, n - 2);
        Ok(Self {
            close: last.close(),
            prev_close: prev.close(),
            prev_prev_close: n.checked_sub(3).map(|k| frames[k].close()),
            ema10: require(last.ema(10), "ema_10", i)?,
            ema20: require(last.ema(20), "ema_20", i)?,
            ema50: require(last.ema(50), "ema_50", i)?,
            prev_ema20: require(prev.ema(20), "ema_20", p)?,
            prev_ema50: require(prev.ema(50), "ema_50", p)?,
            rsi: require(last.rsi, "rsi", i)?,
            macd_histogram: require(last.macd_histogram, "macd_histogram", i)?,
            volume: last.volume(),
            avg_volume: require(last.avg_volume, "avg_volume", i)?,
            obv: require(last.obv, "obv", i)?,
            prev_obv: require(prev.obv, "obv", p)?,
        })
    }

    /// Close rising, above EMA10 or EMA20, and above the close two bars back.
    pub fn passes_prefilter(&self) -> bool {
        let rising = self.close > self.prev_close;
        let above_short = self.close > self.ema10 || self.close > self.ema20;
        let above_two_back = self.prev_prev_close.map_or(true, |c| self.close > c);
        rising && above_short && above_two_back
    }

    pub fn holds(&self, rule: BullishRule, params: &BullishParams) -> bool {
        match rule {
            BullishRule::AboveEma20 => self.close > self.ema20,
            BullishRule::AboveEma50 => self.close > self.ema50,
            BullishRule::Ema20AboveEma50 => self.ema20 > self.ema50,
            BullishRule::FreshEma20Cross => {
                self.ema20 > self.ema50 && self.prev_ema20 <= self.prev_ema50
            }
            BullishRule::RsiInRangeMacdPositive => {
                (params.rsi_min..=params.rsi_max).contains(&self.rsi) && self.macd_histogram > 0.0
            }
            BullishRule::VolumeAboveAverage => self.volume > self.avg_volume,
            BullishRule::ObvRising => self.obv > self.prev_obv,
        }
    }
}

/// Rating outcome before levels are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rating {
    pub rating: u32,
    pub matched: Vec<BullishRule>,
    pub is_bullish: bool,
}

/// Sum of weights over satisfied rules.
pub fn score(matched: &[BullishRule], weights: &RatingWeights) -> u32 {
    matched.iter().map(|r| weights.weight(*r)).sum()
}

pub fn rate(inputs: &RatingInputs, params: &BullishParams) -> Rating {
    if !inputs.passes_prefilter() {
        return Rating {
            rating: 0,
            matched: Vec::new(),
            is_bullish: false,
        };
    }
    let matched: Vec<BullishRule> = BullishRule::ALL
        .into_iter()
        .filter(|r| inputs.holds(*r, params))
        .collect();
    let rating = score(&matched, &params.weights);
    Rating {
        rating,
        is_bullish: rating >= params.threshold,
        matched,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub symbol: String,
    pub is_bullish: bool,
    pub rating: u32,
    pub matched_signals: Vec<String>,
    pub price: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub stop_loss_pct: f64,
    pub target_pct: f64,
    pub risk_reward: f64,
    pub swing_low: f64,
    pub swing_high: f64,
    pub base_stop_level: f64,
    /// Informational only; never used to filter.
    pub market_regime_bullish: Option<bool>,
}

impl ScoreResult {
    /// Zero-rated result for an instrument that could not be scored.
    pub fn neutral(symbol: &str) -> Self {
        let unrated = Rating {
            rating: 0,
            matched: Vec::new(),
            is_bullish: false,
        };
        Self::assemble(symbol, 0.0, &unrated, None, &Levels::zero())
    }

    fn assemble(
        symbol: &str,
        price: f64,
        rating: &Rating,
        swing: Option<SwingRange>,
        levels: &Levels,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            is_bullish: rating.is_bullish,
            rating: rating.rating,
            matched_signals: rating.matched.iter().map(|r| r.label().to_string()).collect(),
            price,
            stop_loss: levels.stop_loss,
            target: levels.target,
            stop_loss_pct: levels.stop_loss_pct,
            target_pct: levels.target_pct,
            risk_reward: levels.risk_reward,
            swing_low: swing.map_or(0.0, |s| s.low),
            swing_high: swing.map_or(0.0, |s| s.high),
            base_stop_level: levels.base_stop_level,
            market_regime_bullish: None,
        }
    }
}

/// Bullish rating scanner.
#[derive(Debug, Clone)]
pub struct BullishRating {
    params: BullishParams,
    levels: LevelParams,
    indicators: IndicatorParams,
}

impl BullishRating {
    pub fn new(params: BullishParams, levels: LevelParams, rsi_period: usize) -> Self {
        let indicators = IndicatorParams {
            rsi_period,
            ema_periods: vec![10, 20, 50],
            ..IndicatorParams::default()
        };
        Self {
            params,
            levels,
            indicators,
        }
    }

    pub fn default_params() -> Self {
        Self::new(BullishParams::default(), LevelParams::default(), 14)
    }

    pub fn params(&self) -> &BullishParams {
        &self.params
    }
}

impl Scanner for BullishRating {
    type Output = ScoreResult;

    fn name(&self) -> &str {
        "bullish_rating"
    }

    fn min_bars(&self) -> usize {
        self.params.min_bars
    }

    fn scan(&self, symbol: &str, candles: &[Candle]) -> Result<Option<ScoreResult>, ScanError> {
        if self.indicators.rsi_period == 0 {
            return Err(ScanError::ComputationDegenerate(format!(
                "{symbol}: rsi_period must be positive"
            )));
        }
        if candles.len() < self.min_bars().max(2) {
            return Ok(Some(ScoreResult::neutral(symbol)));
        }

        let n = candles.len();
        let (close, prev_close) = (candles[n - 1].close, candles[n - 2].close);
        if close <= 0.0 || prev_close <= 0.0 {
            return Err(ScanError::ComputationDegenerate(format!(
                "{symbol}: non-positive close"
            )));
        }

        let frames = compute_frames(candles, &self.indicators);
        let inputs = RatingInputs::from_frames(&frames)?;
        let atr = require(frames[n - 1].atr, "atr", n - 1)?;
        let swing = swing_range(candles, self.levels.swing_window)
            .ok_or_else(|| ScanError::ComputationDegenerate(format!("{symbol}: empty swing window")))?;
        let levels = compute_levels(close, swing, inputs.ema50, atr, &self.levels);
        let rating = rate(&inputs, &self.params);

        Ok(Some(ScoreResult::assemble(symbol, close, &rating, Some(swing), &levels)))
    }

    fn on_failure(&self, symbol: &str, _error: &ScanError) -> Option<ScoreResult> {
        Some(ScoreResult::neutral(symbol))
    }
}
