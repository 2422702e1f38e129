use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the latest close sits relative to the Bollinger envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BollingerZone {
    AboveUpper,
    BelowLower,
    Inside,
}

impl BollingerZone {
    /// Touching a band counts as inside.
    pub fn classify(price: f64, upper: f64, lower: f64) -> Self {
        if price > upper {
            BollingerZone::AboveUpper
        } else if price < lower {
            BollingerZone::BelowLower
        } else {
            BollingerZone::Inside
        }
    }
}

impl fmt::Display for BollingerZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BollingerZone::AboveUpper => write!(f, "above upper band"),
            BollingerZone::BelowLower => write!(f, "below lower band"),
            BollingerZone::Inside => write!(f, "inside the bands"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RsiZone {
    Oversold,
    Overbought,
    Neutral,
}

impl RsiZone {
    /// Values exactly on a threshold are neutral.
    pub fn classify(rsi: f64, thresholds: RsiThresholds) -> Self {
        if rsi < thresholds.oversold {
            RsiZone::Oversold
        } else if rsi > thresholds.overbought {
            RsiZone::Overbought
        } else {
            RsiZone::Neutral
        }
    }
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RsiZone::Oversold => write!(f, "oversold"),
            RsiZone::Overbought => write!(f, "overbought"),
            RsiZone::Neutral => write!(f, "neutral"),
        }
    }
}

/// Price relative to the trend moving average
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn classify(price: f64, moving_average: f64) -> Self {
        if price > moving_average {
            Trend::Up
        } else if price < moving_average {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Up => write!(f, "uptrend"),
            Trend::Down => write!(f, "downtrend"),
            Trend::Flat => write!(f, "undefined"),
        }
    }
}

/// Committed labels a model may return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelLabel {
    Hold,
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
    /// A model was expected but could not answer
    Unavailable,
}

impl Recommendation {
    pub fn is_committed(&self) -> bool {
        !matches!(self, Recommendation::Unavailable)
    }
}

impl From<ModelLabel> for Recommendation {
    fn from(label: ModelLabel) -> Self {
        match label {
            ModelLabel::Hold => Recommendation::Hold,
            ModelLabel::Buy => Recommendation::Buy,
            ModelLabel::Sell => Recommendation::Sell,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::Buy => write!(f, "BUY"),
            Recommendation::Sell => write!(f, "SELL"),
            Recommendation::Hold => write!(f, "HOLD"),
            Recommendation::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

/// Ordered feature names. Models are trained against this exact order.
pub const FEATURE_NAMES: &[&str] = &["price", "rsi", "bb_upper", "bb_lower", "pct_change"];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub price: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub pct_change: f64,
}

impl FeatureVector {
    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.price,
            self.rsi,
            self.bb_upper,
            self.bb_lower,
            self.pct_change,
        ]
    }
}
