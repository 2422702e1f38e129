use crate::domain::errors::SeriesError;
use crate::domain::market::interval::Interval;
use crate::domain::market::symbol::Symbol;
use serde::{Deserialize, Serialize};

/// One OHLCV sample. `timestamp` is the bucket open time in UTC seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Candles for one (symbol, interval) pair, strictly ascending by timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub symbol: Symbol,
    pub interval: Interval,
    candles: Vec<Candle>,
}

impl Series {
    /// Builds a series from candles in any order (some sources send
    /// newest-first). Duplicate timestamps and non-finite or negative
    /// values are integrity violations.
    pub fn from_unordered(
        symbol: Symbol,
        interval: Interval,
        mut candles: Vec<Candle>,
    ) -> Result<Self, SeriesError> {
        if let Some(bad) = candles.iter().find(|c| !c.is_well_formed()) {
            return Err(SeriesError::InvalidValue {
                timestamp: bad.timestamp,
            });
        }

        candles.sort_by_key(|c| c.timestamp);

        if let Some(pair) = candles.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(SeriesError::DuplicateTimestamp {
                timestamp: pair[0].timestamp,
            });
        }

        Ok(Self {
            symbol,
            interval,
            candles,
        })
    }

    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(timestamp: i64, close: f64) -> Candle {
        Candle {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    fn btc() -> Symbol {
        Symbol::parse("BTC-USDT").unwrap()
    }

    #[test]
    fn test_newest_first_input_is_sorted_ascending() {
        let candles = vec![candle(300, 3.0), candle(200, 2.0), candle(100, 1.0)];
        let series = Series::from_unordered(btc(), Interval::OneMin, candles).unwrap();

        let timestamps: Vec<i64> = series.candles().iter().map(|c| c.timestamp).collect();
        assert_eq!(timestamps, vec![100, 200, 300]);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let candles = vec![candle(100, 1.0), candle(200, 2.0), candle(100, 1.5)];
        let err = Series::from_unordered(btc(), Interval::OneMin, candles).unwrap_err();
        assert_eq!(err, SeriesError::DuplicateTimestamp { timestamp: 100 });
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut bad = candle(200, 2.0);
        bad.high = f64::NAN;
        let err =
            Series::from_unordered(btc(), Interval::OneMin, vec![candle(100, 1.0), bad]).unwrap_err();
        assert_eq!(err, SeriesError::InvalidValue { timestamp: 200 });
    }
}
