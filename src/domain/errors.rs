use crate::domain::market::symbol::Symbol;
use thiserror::Error;

/// An interval name outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid interval '{0}'. Valid options: 1min, 5min, 15min, 30min, 1hour, 1day, 1week")]
pub struct InvalidInterval(pub String);

/// Rejected symbol input from the command surface or config
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("Symbol must not be empty")]
    Empty,

    #[error("Invalid symbol '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidCharacters(String),
}

/// Errors returned to the caller of a watch-list mutation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchListError {
    #[error(transparent)]
    InvalidInterval(#[from] InvalidInterval),

    #[error("{0} is already in the watch-list")]
    AlreadyPresent(Symbol),

    #[error("{0} is not in the watch-list")]
    NotFound(Symbol),
}

/// Errors related to market data retrieval.
///
/// Transport failures, non-success codes and malformed payloads all
/// collapse into `DataUnavailable`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarketDataError {
    #[error("Market data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: Symbol, reason: String },
}

/// Data-integrity violations found while normalizing a candle series
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("Duplicate candle timestamp {timestamp}")]
    DuplicateTimestamp { timestamp: i64 },

    #[error("Candle at {timestamp} has a non-finite or negative value")]
    InvalidValue { timestamp: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndicatorError {
    #[error("Insufficient history: need {required} candles, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("Non-finite value in input series at index {index}")]
    NonFiniteInput { index: usize },

    #[error("Invalid indicator period: {0}")]
    InvalidPeriod(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Recommendation model unavailable: {0}")]
    Unavailable(String),

    #[error("Prediction failed: {0}")]
    PredictionFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Chart rendering failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("Alert delivery failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("An analysis pass is already in progress")]
    AlreadyRunning,
}

/// Per-symbol failure inside a pass. Never fatal to the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error(transparent)]
    WatchList(#[from] WatchListError),
}

impl AnalysisError {
    /// True when the failure means there was nothing to analyse
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            AnalysisError::MarketData(MarketDataError::DataUnavailable { .. })
                | AnalysisError::Indicator(IndicatorError::InsufficientHistory { .. })
        )
    }
}
