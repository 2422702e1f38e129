//! Indicator engine: RSI, Bollinger Bands, moving average and
//! percent-change over a candle series. Pure and deterministic.

use crate::domain::analysis::{AugmentedSeries, IndicatorParams, IndicatorPoint, IndicatorSet};
use crate::domain::errors::IndicatorError;
use crate::domain::market::{Candle, Series};
use ta::Next;
use ta::indicators::{BollingerBands, RelativeStrengthIndex, SimpleMovingAverage};

/// RSI reported when price never moved inside the window
const FLAT_RSI: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Result<Self, IndicatorError> {
        // Constructing once validates every period up front
        Self::build_indicators(&params)?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    fn build_indicators(
        params: &IndicatorParams,
    ) -> Result<(RelativeStrengthIndex, BollingerBands, SimpleMovingAverage), IndicatorError> {
        let rsi = RelativeStrengthIndex::new(params.rsi_period)
            .map_err(|e| IndicatorError::InvalidPeriod(format!("rsi_period: {:?}", e)))?;
        let bb = BollingerBands::new(params.bb_period, params.bb_std_dev)
            .map_err(|e| IndicatorError::InvalidPeriod(format!("bb_period: {:?}", e)))?;
        let ma = SimpleMovingAverage::new(params.ma_period)
            .map_err(|e| IndicatorError::InvalidPeriod(format!("ma_period: {:?}", e)))?;
        Ok((rsi, bb, ma))
    }

    /// Attaches indicators to every candle whose lookback windows are full.
    ///
    /// Leading candles without full history are dropped, so a series
    /// shorter than the longest window yields an empty result.
    pub fn compute(&self, series: &Series) -> Result<AugmentedSeries, IndicatorError> {
        let candles = series.candles();
        ensure_finite(candles)?;

        let (mut rsi, mut bb, mut ma) = Self::build_indicators(&self.params)?;
        let warmup = self.params.warmup();
        let mut points = Vec::with_capacity(candles.len().saturating_sub(warmup));
        let mut prev_close: Option<f64> = None;

        for (index, candle) in candles.iter().enumerate() {
            let close = candle.close;
            let rsi_value = rsi.next(close);
            let bands = bb.next(close);
            let moving_average = ma.next(close);
            let previous = prev_close.replace(close);

            if index < warmup {
                continue;
            }

            let Some(previous) = previous else {
                continue;
            };
            let pct_change = (close - previous) / previous;
            if !pct_change.is_finite() {
                // Previous close of zero
                return Err(IndicatorError::NonFiniteInput { index: index - 1 });
            }

            let rsi_value = if rsi_value.is_finite() {
                rsi_value.clamp(0.0, 100.0)
            } else {
                FLAT_RSI
            };

            points.push(IndicatorPoint {
                candle: *candle,
                indicators: IndicatorSet {
                    rsi: rsi_value,
                    bb_upper: bands.upper,
                    bb_middle: bands.average,
                    bb_lower: bands.lower,
                    moving_average,
                    pct_change,
                },
            });
        }

        Ok(AugmentedSeries {
            symbol: series.symbol.clone(),
            interval: series.interval,
            points,
        })
    }
}

fn ensure_finite(candles: &[Candle]) -> Result<(), IndicatorError> {
    match candles.iter().position(|c| {
        ![c.open, c.high, c.low, c.close, c.volume]
            .iter()
            .all(|v| v.is_finite())
    }) {
        Some(index) => Err(IndicatorError::NonFiniteInput { index }),
        None => Ok(()),
    }
}

/// Fractional change of the last close against the one before it
pub fn percent_change(closes: &[f64]) -> Result<f64, IndicatorError> {
    let [.., previous, last] = closes else {
        return Err(IndicatorError::InsufficientHistory {
            required: 2,
            available: closes.len(),
        });
    };

    let change = (last - previous) / previous;
    if change.is_finite() {
        Ok(change)
    } else {
        Err(IndicatorError::NonFiniteInput {
            index: closes.len() - 2,
        })
    }
}

/// Mean volume of the last `period` candles, `None` if there are fewer
pub fn mean_volume(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period {
        return None;
    }
    let window = &candles[candles.len() - period..];
    Some(window.iter().map(|c| c.volume).sum::<f64>() / period as f64)
}
