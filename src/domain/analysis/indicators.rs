use crate::domain::market::{Candle, Interval, Symbol};
use serde::{Deserialize, Serialize};

/// Derived values for one timestamp. Only produced once every lookback
/// window is fully populated, so no field is ever a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub moving_average: f64,
    /// `(close[t] - close[t-1]) / close[t-1]`, as a fraction
    pub pct_change: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorPoint {
    pub candle: Candle,
    pub indicators: IndicatorSet,
}

/// A series with its leading warmup rows trimmed and indicators attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedSeries {
    pub symbol: Symbol,
    pub interval: Interval,
    pub points: Vec<IndicatorPoint>,
}

impl AugmentedSeries {
    pub fn latest(&self) -> Option<&IndicatorPoint> {
        self.points.last()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }
}

/// Lookback windows used by the indicator engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorParams {
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub ma_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            bb_period: 20,
            bb_std_dev: 2.0,
            ma_period: 20,
        }
    }
}

impl IndicatorParams {
    /// Index of the first candle where every indicator is defined.
    ///
    /// RSI needs `rsi_period` price changes, the rolling windows need
    /// `period` closes, percent-change needs one previous close.
    pub fn warmup(&self) -> usize {
        self.rsi_period
            .max(self.bb_period.saturating_sub(1))
            .max(self.ma_period.saturating_sub(1))
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_uses_longest_window() {
        assert_eq!(IndicatorParams::default().warmup(), 19);

        let long_trend = IndicatorParams {
            ma_period: 50,
            ..Default::default()
        };
        assert_eq!(long_trend.warmup(), 49);

        let long_rsi = IndicatorParams {
            rsi_period: 25,
            ..Default::default()
        };
        assert_eq!(long_rsi.warmup(), 25);
    }
}
